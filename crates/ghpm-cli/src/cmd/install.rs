//! Install command

use std::sync::Arc;

use anyhow::{Context as _, Result};
use ghpm_core::Reporter;
use ghpm_core::Settings;

use crate::ops::{Context, install_package};
use crate::ui::Output;

/// Install the latest release of the repository best matching `name`.
pub async fn install(settings: &Settings, name: &str) -> Result<()> {
    let reporter = Output::new();
    let ctx = Context::from_settings(settings, Arc::new(reporter))
        .context("Failed to create GitHub client")?;

    reporter.section(&format!("Installing {name}"));
    let summary = install_package(&ctx, name)
        .await
        .with_context(|| format!("Failed to install '{name}'"))?;

    for link in &summary.created {
        reporter.info(&format!("linked {}", link.display()));
    }
    for existing in &summary.existing {
        if existing.points_to_target() {
            reporter.info(&format!("{} already exists", existing.link.display()));
        }
    }

    reporter.success(&format!(
        "installed package '{}' ({})",
        summary.repository.full_name, summary.release.tag_name
    ));
    Ok(())
}
