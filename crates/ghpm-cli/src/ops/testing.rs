//! In-memory release source and scratch layouts for pipeline tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use ghpm_core::release::Owner;
use ghpm_core::{
    Asset, Layout, NullReporter, Permissions, Release, ReleaseSource, Reporter, Repository,
    SourceError,
};
use ghpm_schema::{Arch, Os, Platform};
use tempfile::TempDir;

use super::Context;

pub fn repository(owner: &str, name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        full_name: format!("{owner}/{name}"),
        owner: Owner {
            login: owner.to_string(),
        },
        description: Some(format!("{name} does things")),
        homepage: None,
        html_url: format!("https://github.com/{owner}/{name}"),
        language: Some("Rust".to_string()),
        stars: 42,
        forks: 3,
        topics: Vec::new(),
    }
}

pub fn tar_gz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// Serves a fixed set of repositories, releases and asset bodies.
#[derive(Default)]
pub struct FakeSource {
    pub repositories: Vec<Repository>,
    pub releases: HashMap<String, Vec<Release>>,
    pub payloads: HashMap<u64, Vec<u8>>,
}

impl FakeSource {
    /// One repository with one release carrying `assets` (name, body).
    pub fn single(owner: &str, name: &str, tag: &str, assets: Vec<(&str, Vec<u8>)>) -> Self {
        let mut source = Self::default();
        let mut release = Release {
            tag_name: tag.to_string(),
            name: Some(tag.to_string()),
            html_url: format!("https://github.com/{owner}/{name}/releases/tag/{tag}"),
            assets: Vec::new(),
        };
        for (id, (asset_name, body)) in assets.into_iter().enumerate() {
            let id = id as u64 + 1;
            release.assets.push(Asset {
                id,
                name: asset_name.to_string(),
                download_url: String::new(),
                size: body.len() as u64,
            });
            source.payloads.insert(id, body);
        }
        source.repositories.push(repository(owner, name));
        source.releases.insert(format!("{owner}/{name}"), vec![release]);
        source
    }
}

#[async_trait]
impl ReleaseSource for FakeSource {
    async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>, SourceError> {
        Ok(self
            .repositories
            .iter()
            .filter(|r| r.full_name.contains(query))
            .cloned()
            .collect())
    }

    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, SourceError> {
        Ok(self
            .releases
            .get(&format!("{owner}/{repo}"))
            .cloned()
            .unwrap_or_default())
    }

    async fn download_asset(
        &self,
        _repository: &Repository,
        asset: &Asset,
        dest: &Path,
    ) -> Result<u64, SourceError> {
        let body = self
            .payloads
            .get(&asset.id)
            .ok_or_else(|| SourceError::Other(format!("no payload for {}", asset.name)))?;
        std::fs::write(dest, body).map_err(|source| SourceError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(body.len() as u64)
    }
}

/// Reporter that keeps every message as `level:text`.
#[derive(Default)]
pub struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, level: &str, msg: &str) {
        self.0.lock().unwrap().push(format!("{level}:{msg}"));
    }
}

impl Reporter for Recorder {
    fn section(&self, title: &str) {
        self.push("section", title);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn warning(&self, msg: &str) {
        self.push("warning", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
}

/// Context rooted in a fresh temp dir, preferring linux/x64.
pub fn context(source: FakeSource) -> (TempDir, Context) {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = Context::new(
        Arc::new(source),
        Layout::under(dir.path()),
        Permissions::default(),
        Arc::new(NullReporter),
    );
    ctx.preferences = vec![
        Platform::new(Os::Linux, Arch::X64),
        Platform::new(Os::Linux, Arch::Unknown),
    ];
    (dir, ctx)
}
