//! Archive extraction module
//!
//! Unpacks `.tar.gz` release assets and places standalone binaries. Every
//! archive entry is checked against the destination before anything touches
//! the filesystem, so a crafted entry name cannot write outside it.

use std::fs::{self, DirBuilder, File};
use std::io::{self, BufReader, Read};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt archive {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive entry '{entry}' escapes the destination directory")]
    PathTraversal { entry: PathBuf },

    #[error("Unsupported entry type {kind} for '{entry}'")]
    UnsupportedEntry { entry: PathBuf, kind: String },
}

fn io_at(path: &Path) -> impl Fn(io::Error) -> ExtractError + '_ {
    move |source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `path` and any missing parents with `mode`. Existing directories are fine.
pub fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    DirBuilder::new().recursive(true).mode(mode).create(path)
}

/// Lexically normalise a path: drop `.`, resolve `..` against the preceding
/// component. Never touches the filesystem, so symlinks are not followed.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Resolve an entry name under `root` (already absolute and clean).
///
/// Returns `None` unless the result lies strictly inside `root`.
fn resolve_entry(root: &Path, name: &Path) -> Option<PathBuf> {
    let target = clean_path(&root.join(name));
    (target.starts_with(root) && target != root).then_some(target)
}

/// Extract a tar.gz archive to a destination directory.
///
/// Directories are created with `mode`; regular files are copied verbatim.
/// Returns the paths of the extracted files in archive order.
///
/// # Errors
///
/// - [`ExtractError::PathTraversal`] if any entry would land outside
///   `dest_dir`; extraction stops before that entry is written.
/// - [`ExtractError::UnsupportedEntry`] for links, devices and other
///   non-file, non-directory entries.
/// - [`ExtractError::Io`] / [`ExtractError::Corrupt`] for filesystem and
///   stream failures.
pub fn extract_tar_gz(
    archive_path: &Path,
    dest_dir: &Path,
    mode: u32,
) -> Result<Vec<PathBuf>, ExtractError> {
    create_dir_with_mode(dest_dir, mode).map_err(io_at(dest_dir))?;

    let file = File::open(archive_path).map_err(io_at(archive_path))?;
    let gz_decoder = GzDecoder::new(BufReader::new(file));

    extract_tar(gz_decoder, archive_path, dest_dir, mode)
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(
    reader: R,
    archive_path: &Path,
    dest_dir: &Path,
    mode: u32,
) -> Result<Vec<PathBuf>, ExtractError> {
    let root = std::path::absolute(dest_dir)
        .map(|p| clean_path(&p))
        .map_err(io_at(dest_dir))?;
    let corrupt = |source| ExtractError::Corrupt {
        path: archive_path.to_path_buf(),
        source,
    };

    let mut archive = tar::Archive::new(reader);
    let mut extracted = Vec::new();

    for entry in archive.entries().map_err(corrupt)? {
        let mut entry = entry.map_err(corrupt)?;
        let name = entry.path().map_err(corrupt)?.into_owned();
        let kind = entry.header().entry_type();

        // pax global headers describe the archive, not a file
        if kind == EntryType::XGlobalHeader {
            continue;
        }

        // "./" and friends
        if kind.is_dir() && clean_path(&root.join(&name)) == root {
            continue;
        }

        let Some(target) = resolve_entry(&root, &name) else {
            tracing::warn!(entry = %name.display(), "rejecting archive entry outside destination");
            return Err(ExtractError::PathTraversal { entry: name });
        };

        if kind.is_dir() {
            create_dir_with_mode(&target, mode).map_err(io_at(&target))?;
        } else if kind.is_file() {
            if let Some(parent) = target.parent() {
                create_dir_with_mode(parent, mode).map_err(io_at(parent))?;
            }
            let mut out = File::create(&target).map_err(io_at(&target))?;
            io::copy(&mut entry, &mut out).map_err(io_at(&target))?;
            extracted.push(target);
        } else {
            return Err(ExtractError::UnsupportedEntry {
                entry: name,
                kind: format!("{kind:?}"),
            });
        }
    }

    tracing::debug!(files = extracted.len(), dest = %root.display(), "extracted archive");
    Ok(extracted)
}

/// Move a standalone executable into a fresh package directory as `file_name`.
///
/// Falls back to copy-and-delete when `src` and `package_dir` are on
/// different filesystems.
///
/// # Errors
///
/// Returns [`ExtractError::Io`] if the directory cannot be created or the
/// file cannot be moved.
pub fn place_binary(
    src: &Path,
    package_dir: &Path,
    file_name: &str,
    mode: u32,
) -> Result<PathBuf, ExtractError> {
    create_dir_with_mode(package_dir, mode).map_err(io_at(package_dir))?;

    let dest = package_dir.join(file_name);
    if fs::rename(src, &dest).is_err() {
        fs::copy(src, &dest).map_err(io_at(&dest))?;
        fs::remove_file(src).map_err(io_at(src))?;
    }
    Ok(dest)
}
