//! List command

use anyhow::{Context, Result};
use ghpm_core::Settings;
use ghpm_core::metadata::MetadataStore;

use crate::ui::table::table;

/// List all installed packages
pub fn list(settings: &Settings) -> Result<()> {
    let store = MetadataStore::new(&settings.layout.metadata, settings.permissions.downloads);
    let records = store
        .load_all()
        .context("Failed to read installed packages")?;

    if records.is_empty() {
        println!("no packages installed");
        return Ok(());
    }

    println!("{} packages installed", records.len());
    println!();

    let mut rows = table(&["repo", "version", "binaries"]);
    for record in &records {
        rows.add_row(vec![
            record.full_name(),
            record.package.version.to_string(),
            record.binaries().join(", "),
        ]);
    }
    println!("{rows}");

    Ok(())
}
