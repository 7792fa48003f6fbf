//! Filesystem layout and environment-driven settings.
//!
//! Every location can be overridden with a `GHPM_*` variable; defaults live
//! under the user's local data directory (`~/.local/share/ghpm` on Linux)
//! with symlinks in `~/.local/bin`.

use dirs::{data_local_dir, home_dir};
use std::path::PathBuf;

/// Default mode for created directories and downloaded files.
pub const DEFAULT_DOWNLOADS_PERMISSIONS: u32 = 0o744;

/// Default mode applied to linked binaries.
pub const DEFAULT_SYMLINKS_PERMISSIONS: u32 = 0o755;

/// Default GitHub REST endpoint.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Where every piece of an installation lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Staging area for downloaded assets.
    pub downloads: PathBuf,
    /// One sub-directory per installed repository.
    pub packages: PathBuf,
    /// One metadata file per installed repository.
    pub metadata: PathBuf,
    /// Symlinks to installed binaries; expected on `PATH`.
    pub bin: PathBuf,
    /// Log files.
    pub logs: PathBuf,
}

impl Layout {
    /// All directories under a single root, with `bin` at `<root>/bin`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            downloads: root.join("downloads"),
            packages: root.join("packages"),
            metadata: root.join("metadata"),
            bin: root.join("bin"),
            logs: root.join("logs"),
        }
    }

    /// Path of the package directory for a repository.
    pub fn package_dir(&self, repo: &str) -> PathBuf {
        self.packages.join(repo)
    }

    /// Path of the staged download for an asset.
    pub fn staged_download(&self, asset_name: &str) -> PathBuf {
        self.downloads.join(asset_name)
    }
}

/// Modes applied to created files and directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    /// Mode for package, download, metadata and bin directories and files.
    pub downloads: u32,
    /// Mode forced onto binaries before they are linked.
    pub symlinks: u32,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            downloads: DEFAULT_DOWNLOADS_PERMISSIONS,
            symlinks: DEFAULT_SYMLINKS_PERMISSIONS,
        }
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub layout: Layout,
    pub permissions: Permissions,
    pub github_api: String,
    pub github_token: Option<String>,
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error string if no home or data directory can be determined
    /// and `GHPM_HOME` is unset.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error string if neither `GHPM_HOME` nor a platform data
    /// directory is available.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let root = match var("GHPM_HOME") {
            Some(home) => PathBuf::from(home),
            None => data_local_dir()
                .map(|d| d.join("ghpm"))
                .ok_or("Could not determine data directory. Set GHPM_HOME to override.")?,
        };
        let default_bin = home_dir().map_or_else(|| root.join("bin"), |h| h.join(".local/bin"));

        let path_or = |key: &str, default: PathBuf| var(key).map_or(default, PathBuf::from);
        let layout = Layout {
            downloads: path_or("GHPM_DOWNLOADS_PATH", root.join("downloads")),
            packages: path_or("GHPM_PACKAGES_PATH", root.join("packages")),
            metadata: path_or("GHPM_METADATA_PATH", root.join("metadata")),
            bin: path_or("GHPM_BIN_PATH", default_bin),
            logs: path_or("GHPM_LOGS_PATH", root.join("logs")),
        };

        let mode_or = |key: &str, default: u32| {
            var(key)
                .and_then(|v| parse_mode(&v))
                .unwrap_or(default)
        };
        let permissions = Permissions {
            downloads: mode_or("GHPM_DOWNLOADS_PERMISSIONS", DEFAULT_DOWNLOADS_PERMISSIONS),
            symlinks: mode_or("GHPM_SYMLINKS_PERMISSIONS", DEFAULT_SYMLINKS_PERMISSIONS),
        };

        Ok(Self {
            layout,
            permissions,
            github_api: var("GHPM_GITHUB_API").unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            github_token: var("GITHUB_TOKEN"),
        })
    }
}

/// Parse an octal file mode such as `0755`, `755` or `0o755`.
///
/// Unparsable values yield `None` and the caller keeps its default.
pub fn parse_mode(value: &str) -> Option<u32> {
    let digits = value.trim().trim_start_matches("0o");
    u32::from_str_radix(digits, 8).ok().filter(|m| *m <= 0o7777)
}
