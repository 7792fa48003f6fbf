//! On-disk record of an installed package.
//!
//! The field names and nesting are part of the file format; older records
//! must stay readable, so renames here are breaking changes.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::version::Version;

/// Identity and resolved version of an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Repository owner.
    pub owner: String,
    /// Repository name; also the metadata file name.
    pub repo: String,
    /// Release tag that was installed.
    pub version: Version,
}

/// Where the package landed on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Absolute path of the unpacked package directory.
    pub package: PathBuf,
    /// Absolute paths of the symlinks created for the package, in creation order.
    #[serde(rename = "symlink", default, deserialize_with = "null_as_empty")]
    pub symlinks: Vec<PathBuf>,
}

/// A complete installed-package record, one per metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Package identity.
    pub package: PackageRecord,
    /// Installed files.
    pub installation: Installation,
}

impl Metadata {
    /// `owner/repo` of the installed package.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.package.owner, self.package.repo)
    }

    /// File names of the exposed binaries.
    pub fn binaries(&self) -> Vec<String> {
        self.installation
            .symlinks
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }
}

// Records written by older releases store an empty link list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PathBuf>>::deserialize(deserializer)?.unwrap_or_default())
}
