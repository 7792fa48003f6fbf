//! Search command

use anyhow::{Context, Result};
use ghpm_core::io::GitHubSource;
use ghpm_core::{ReleaseSource, Settings};

use crate::ui::table::{description, table};

/// Rows shown for a search.
const MAX_RESULTS: usize = 10;

/// Search GitHub repositories and show the best matches.
pub async fn search(settings: &Settings, name: &str) -> Result<()> {
    let source = GitHubSource::from_settings(settings).context("Failed to create GitHub client")?;
    let repositories = source
        .search_repositories(name)
        .await
        .with_context(|| format!("Failed to search for '{name}'"))?;

    println!("found {} repositories", repositories.len());
    if repositories.is_empty() {
        return Ok(());
    }
    println!();

    let mut rows = table(&["repo", "stars", "description"]);
    for repo in repositories.iter().take(MAX_RESULTS) {
        rows.add_row(vec![
            repo.full_name.clone(),
            repo.stars.to_string(),
            description(repo.description.as_deref()),
        ]);
    }
    println!("{rows}");

    Ok(())
}
