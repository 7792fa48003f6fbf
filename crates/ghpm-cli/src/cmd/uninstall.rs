//! Uninstall command

use std::sync::Arc;

use anyhow::{Context as _, Result};
use ghpm_core::Reporter;
use ghpm_core::Settings;

use crate::ops::{Context, UninstallOutcome, uninstall_package};
use crate::ui::Output;

/// Remove an installed package. Not being installed is not an error.
pub fn uninstall(settings: &Settings, name: &str) -> Result<()> {
    let reporter = Output::new();
    let ctx = Context::from_settings(settings, Arc::new(reporter))
        .context("Failed to create GitHub client")?;

    match uninstall_package(&ctx, name).with_context(|| format!("Failed to uninstall '{name}'"))? {
        UninstallOutcome::NotInstalled => {
            reporter.info(&format!("package '{name}' isn't installed"));
        }
        UninstallOutcome::Removed(record) => {
            reporter.success(&format!("uninstalled package '{}'", record.full_name()));
        }
    }
    Ok(())
}
