//! Install and uninstall pipelines.

pub mod context;
pub mod error;
pub mod install;
pub mod uninstall;

#[cfg(test)]
pub(crate) mod testing;

pub use context::Context;
pub use error::{InstallError, InstallStage, UninstallError};
pub use install::{InstallSummary, install_package};
pub use uninstall::{UninstallOutcome, uninstall_package};
