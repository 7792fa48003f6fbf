//! Expose a package's executables through symlinks in the bin directory.
//!
//! Only the top level of the package and its `bin/` sub-directory are
//! considered. Files that look like documentation or carry a non-script
//! extension are left alone.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::extract::create_dir_with_mode;
use crate::paths::Permissions;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to create bin directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to set permissions on {path}: {source}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to link {link} -> {target}: {source}")]
    Symlink {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A link failure, with the links that were created before it.
#[derive(Error, Debug)]
#[error("{source} ({} link(s) created before the failure)", created.len())]
pub struct PartialLinkError {
    pub created: Vec<PathBuf>,
    #[source]
    pub source: LinkError,
}

/// A destination that was already occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingLink {
    pub link: PathBuf,
    /// The file we wanted to link to.
    pub target: PathBuf,
}

impl ExistingLink {
    /// Whether the occupying entry is a symlink to `target` already.
    pub fn points_to_target(&self) -> bool {
        fs::read_link(&self.link).is_ok_and(|current| current == self.target)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<ExistingLink>,
}

/// Whether a top-level file should be exposed.
pub fn is_linkable(file_name: &str) -> bool {
    let path = Path::new(file_name);
    let extension_ok = path.extension().is_none_or(|ext| ext == "sh");
    let lower = file_name.to_lowercase();
    extension_ok && !lower.contains("readme") && !lower.contains("license")
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, LinkError> {
    let read_err = |source| LinkError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)?;
    entries.sort_by_key(fs::DirEntry::file_name);
    Ok(entries)
}

/// Collect the files to link: top-level candidates and everything directly
/// inside `bin/`.
fn candidates(package_dir: &Path) -> Result<Vec<PathBuf>, LinkError> {
    let mut files = Vec::new();

    for entry in sorted_entries(package_dir)? {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| LinkError::ReadDir {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            if entry.file_name() == "bin" {
                for bin_entry in sorted_entries(&path)? {
                    if bin_entry.file_type().is_ok_and(|t| t.is_file()) {
                        files.push(bin_entry.path());
                    }
                }
            }
        } else if file_type.is_file() && is_linkable(&entry.file_name().to_string_lossy()) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Link the executables of `package_dir` into `bin_dir`.
///
/// A missing `bin_dir` is created with `permissions.downloads`. Each source
/// gets its permission bits set to `permissions.symlinks` first. Destinations
/// that already exist are reported in [`LinkReport::existing`] and left
/// untouched.
///
/// # Errors
///
/// Any other failure stops linking; the returned [`PartialLinkError`]
/// carries the links created so far so the caller can remove them.
pub fn add_symlinks(
    package_dir: &Path,
    bin_dir: &Path,
    permissions: Permissions,
) -> Result<LinkReport, PartialLinkError> {
    let mut report = LinkReport::default();
    let fail = |created: Vec<PathBuf>, source| PartialLinkError { created, source };

    if let Err(source) = create_dir_with_mode(bin_dir, permissions.downloads) {
        return Err(fail(
            report.created,
            LinkError::CreateDir {
                path: bin_dir.to_path_buf(),
                source,
            },
        ));
    }

    let files = match candidates(package_dir) {
        Ok(files) => files,
        Err(e) => return Err(fail(report.created, e)),
    };

    for file in files {
        let target = match std::path::absolute(&file) {
            Ok(target) => target,
            Err(source) => {
                return Err(fail(
                    report.created,
                    LinkError::ReadDir { path: file, source },
                ));
            }
        };

        let source_mode = fs::Permissions::from_mode(permissions.symlinks);
        if let Err(source) = fs::set_permissions(&target, source_mode) {
            return Err(fail(
                report.created,
                LinkError::Permissions {
                    path: target,
                    source,
                },
            ));
        }

        // candidates() only yields paths with a file name
        let Some(name) = target.file_name() else {
            continue;
        };
        let link = bin_dir.join(name);

        match std::os::unix::fs::symlink(&target, &link) {
            Ok(()) => {
                tracing::debug!(link = %link.display(), target = %target.display(), "linked");
                report.created.push(link);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(link = %link.display(), "link already exists");
                report.existing.push(ExistingLink { link, target });
            }
            Err(source) => {
                return Err(fail(
                    report.created,
                    LinkError::Symlink {
                        link,
                        target,
                        source,
                    },
                ));
            }
        }
    }

    Ok(report)
}
