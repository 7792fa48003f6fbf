//! Package removal.
//!
//! Files go first and the metadata record last, so an interrupted uninstall
//! still shows up as installed and can simply be run again.

use std::fs;
use std::io;
use std::path::Path;

use ghpm_schema::{Metadata, PackageSpec};

use crate::ops::{Context, UninstallError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    NotInstalled,
    Removed(Metadata),
}

fn remove_err(path: &Path) -> impl FnOnce(io::Error) -> UninstallError + '_ {
    move |source| UninstallError::Remove {
        path: path.to_path_buf(),
        source,
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Uninstall the package named `name` (`repo` or `owner/repo[@version]`).
///
/// Matching is by repository name only.
pub fn uninstall_package(ctx: &Context, name: &str) -> Result<UninstallOutcome, UninstallError> {
    let _span = tracing::info_span!("uninstall", package = name).entered();
    let store = ctx.metadata_store();

    if store.entries()?.is_empty() {
        tracing::debug!("no metadata records");
        return Ok(UninstallOutcome::NotInstalled);
    }

    let spec = PackageSpec::parse(name)?;
    let Some((path, record)) = store.find(&spec.repo)? else {
        tracing::debug!(%spec, "no matching record");
        return Ok(UninstallOutcome::NotInstalled);
    };

    let package_dir = &record.installation.package;
    ignore_missing(fs::remove_dir_all(package_dir)).map_err(remove_err(package_dir))?;
    tracing::debug!(path = %package_dir.display(), "removed package directory");

    for link in &record.installation.symlinks {
        match fs::symlink_metadata(link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                ignore_missing(fs::remove_file(link)).map_err(remove_err(link))?;
            }
            Ok(_) => ctx.reporter.warning(&format!(
                "{} is no longer a symlink and was left in place",
                link.display()
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(remove_err(link)(e)),
        }
    }

    store.remove(&path)?;
    tracing::info!(package = %record.full_name(), "uninstalled");
    Ok(UninstallOutcome::Removed(record))
}
