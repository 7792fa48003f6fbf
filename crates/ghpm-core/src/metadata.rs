//! Installed-package records, one JSON file per repository.
//!
//! A package counts as installed exactly when its record exists. Records are
//! written to a temporary file in the metadata directory and renamed into
//! place, so a crash mid-write never leaves a truncated record behind.

use std::fs;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use ghpm_schema::{Installation, Metadata, PackageRecord, Version};
use thiserror::Error;

use crate::io::extract::create_dir_with_mode;
use crate::release::{Release, Repository};

/// Prefix of in-flight record files. Repository names may start with a dot,
/// so only this prefix marks a file as not being a record.
const TEMP_PREFIX: &str = ".ghpm-tmp";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed metadata in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_at(path: &Path) -> impl Fn(io::Error) -> MetadataError + '_ {
    move |source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
    mode: u32,
}

impl MetadataStore {
    pub fn new(dir: impl Into<PathBuf>, mode: u32) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    /// Record file for a repository.
    pub fn path_for(&self, repo: &str) -> PathBuf {
        self.dir.join(repo)
    }

    /// Write the record for a finished install, replacing any previous one.
    ///
    /// The version is the release tag as published; it is not parsed.
    pub fn save(
        &self,
        package_dir: &Path,
        repository: &Repository,
        release: &Release,
        symlinks: &[PathBuf],
    ) -> Result<PathBuf, MetadataError> {
        create_dir_with_mode(&self.dir, self.mode).map_err(io_at(&self.dir))?;

        let package = std::path::absolute(package_dir).map_err(io_at(package_dir))?;
        let record = Metadata {
            package: PackageRecord {
                owner: repository.owner().to_string(),
                repo: repository.name.clone(),
                version: Version::raw(&release.tag_name),
            },
            installation: Installation {
                package,
                symlinks: symlinks.to_vec(),
            },
        };

        let path = self.path_for(&repository.name);
        self.write_atomic(&path, &record)?;
        tracing::debug!(path = %path.display(), "saved metadata");
        Ok(path)
    }

    fn write_atomic(&self, path: &Path, record: &Metadata) -> Result<(), MetadataError> {
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)
            .map_err(io_at(&self.dir))?;
        let tmp_path = tmp.path().to_path_buf();

        serde_json::to_writer_pretty(tmp.as_file_mut(), record).map_err(|source| {
            MetadataError::Io {
                path: tmp_path.clone(),
                source: source.into(),
            }
        })?;
        let file = tmp.as_file_mut();
        file.write_all(b"\n").map_err(io_at(&tmp_path))?;
        file.sync_all().map_err(io_at(&tmp_path))?;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(self.mode))
            .map_err(io_at(&tmp_path))?;

        tmp.persist(path).map_err(|e| MetadataError::Io {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }

    /// Read and parse one record.
    pub fn read(&self, path: &Path) -> Result<Metadata, MetadataError> {
        let bytes = fs::read(path).map_err(io_at(path))?;
        serde_json::from_slice(&bytes).map_err(|source| MetadataError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Record files, sorted by name. Empty when the directory does not exist.
    pub fn entries(&self) -> Result<Vec<PathBuf>, MetadataError> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_at(&self.dir)(e)),
        };

        let mut paths = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(io_at(&self.dir))?;
            // leftovers of interrupted writes
            if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
                continue;
            }
            if entry.file_type().is_ok_and(|t| t.is_file()) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Every record, in file-name order.
    pub fn load_all(&self) -> Result<Vec<Metadata>, MetadataError> {
        self.entries()?.iter().map(|p| self.read(p)).collect()
    }

    /// The record of `repo`, if installed.
    ///
    /// A record only counts when both its file name and its stored repository
    /// name equal `repo`.
    pub fn find(&self, repo: &str) -> Result<Option<(PathBuf, Metadata)>, MetadataError> {
        let path = self.path_for(repo);
        if !self.entries()?.contains(&path) {
            return Ok(None);
        }
        let record = self.read(&path)?;
        Ok((record.package.repo == repo).then_some((path, record)))
    }

    /// Delete a record. A record that is already gone is not an error.
    pub fn remove(&self, path: &Path) -> Result<(), MetadataError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_at(path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Owner;
    use tempfile::tempdir;

    fn repository(name: &str) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("acme/{name}"),
            owner: Owner {
                login: "acme".to_string(),
            },
            description: None,
            homepage: None,
            html_url: String::new(),
            language: None,
            stars: 0,
            forks: 0,
            topics: Vec::new(),
        }
    }

    fn release(tag: &str) -> Release {
        Release {
            tag_name: tag.to_string(),
            name: None,
            html_url: String::new(),
            assets: Vec::new(),
        }
    }

    #[test]
    fn test_save_then_read() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata"), 0o744);
        let pkg = dir.path().join("packages/tool");
        let links = vec![dir.path().join("bin/tool"), dir.path().join("bin/tool.sh")];

        let path = store
            .save(&pkg, &repository("tool"), &release("v1.2.3"), &links)
            .unwrap();
        assert_eq!(path, dir.path().join("metadata/tool"));

        let record = store.read(&path).unwrap();
        assert_eq!(record.package.owner, "acme");
        assert_eq!(record.package.repo, "tool");
        assert_eq!(record.package.version.as_str(), "v1.2.3");
        assert!(record.package.version.components.is_none());
        assert_eq!(record.installation.package, pkg);
        assert_eq!(record.installation.symlinks, links);
    }

    #[test]
    fn test_file_format() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let path = store
            .save(Path::new("/opt/tool"), &repository("tool"), &release("v2"), &[])
            .unwrap();

        let text = fs::read_to_string(path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["package"]["version"]["value"], "v2");
        assert_eq!(json["installation"]["package"], "/opt/tool");
        assert!(json["installation"]["symlink"].is_array());
        assert!(text.contains("\n  \"package\""));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let repo = repository("tool");
        store
            .save(Path::new("/opt/tool"), &repo, &release("v1"), &[PathBuf::from("/bin/a")])
            .unwrap();
        let path = store
            .save(Path::new("/opt/tool"), &repo, &release("v2"), &[])
            .unwrap();

        let record = store.read(&path).unwrap();
        assert_eq!(record.package.version.as_str(), "v2");
        assert!(record.installation.symlinks.is_empty());
        assert_eq!(store.entries().unwrap(), vec![path]);
    }

    #[test]
    fn test_malformed_record() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let path = dir.path().join("broken");
        fs::write(&path, "{ not json").unwrap();

        let err = store.read(&path).unwrap_err();
        assert!(matches!(err, MetadataError::Malformed { path: p, .. } if p == path));
        assert!(store.load_all().is_err());
    }

    #[test]
    fn test_absent_directory_is_empty() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("missing"), 0o744);
        assert!(store.entries().unwrap().is_empty());
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.find("tool").unwrap().is_none());
    }

    #[test]
    fn test_find_requires_matching_repo() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let path = store
            .save(Path::new("/opt/tool"), &repository("tool"), &release("v1"), &[])
            .unwrap();

        // same record under a different file name
        fs::copy(&path, dir.path().join("other")).unwrap();

        assert!(store.find("tool").unwrap().is_some());
        assert!(store.find("other").unwrap().is_none());
        assert!(store.find("nothing").unwrap().is_none());
    }

    #[test]
    fn test_dot_prefixed_repository_is_listed() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let path = store
            .save(Path::new("/opt/.dotool"), &repository(".dotool"), &release("v1"), &[])
            .unwrap();

        // an interrupted write
        fs::write(dir.path().join(format!("{TEMP_PREFIX}abc123")), "{").unwrap();

        assert_eq!(store.entries().unwrap(), vec![path.clone()]);
        assert_eq!(store.load_all().unwrap().len(), 1);
        let (found, record) = store.find(".dotool").unwrap().unwrap();
        assert_eq!(found, path);
        assert_eq!(record.package.repo, ".dotool");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path(), 0o744);
        let path = store
            .save(Path::new("/opt/tool"), &repository("tool"), &release("v1"), &[])
            .unwrap();

        store.remove(&path).unwrap();
        store.remove(&path).unwrap();
        assert!(store.entries().unwrap().is_empty());
    }
}
