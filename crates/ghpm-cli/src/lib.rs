//! ghpm - a package manager for GitHub release binaries
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Installs command-line tools straight from the latest GitHub release of a
//! repository: the asset matching the host platform is downloaded, unpacked
//! into its own package directory and its executables are symlinked into a
//! bin directory on `PATH`.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.local/share/ghpm/
//! ├── downloads/  # Staged assets, removed after every install
//! ├── packages/   # One directory per repository
//! ├── metadata/   # One JSON record per installed repository
//! └── logs/       # ghpm.log
//! ~/.local/bin/   # Symlinks to installed binaries
//! ```

pub mod cmd;
pub mod ops;
pub mod ui;

pub use ghpm_core::paths::*;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ghpm")]
#[command(author, version, about = "ghpm - install binaries from GitHub releases")]
pub struct Cli {
    /// Log debug detail to the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the latest release of a repository
    Install {
        /// Repository name to search for, e.g. bat or sharkdp/bat
        name: String,
    },
    /// Remove an installed package
    Uninstall {
        /// Package: repo, or owner/repo[@version]
        name: String,
    },
    /// List installed packages
    List,
    /// Search GitHub repositories
    Search {
        /// Search query
        name: String,
    },
    /// Show repository details and its releases
    Info {
        /// Repository name to search for
        name: String,
    },
}
