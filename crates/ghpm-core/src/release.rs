//! Repository, release and asset records, and the source that lists them.
//!
//! The install pipeline only needs three things from a release host: search
//! repositories by name, list the releases of one repository (newest first),
//! and stream a single asset to disk. [`ReleaseSource`] captures exactly that,
//! so tests can swap the network for an in-memory fake.

use std::path::Path;

use async_trait::async_trait;
use ghpm_schema::Platform;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

/// Owner of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// A repository as returned by a search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "stargazers_count")]
    pub stars: u64,
    #[serde(default, rename = "forks_count")]
    pub forks: u64,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Repository {
    /// Repository owner login.
    pub fn owner(&self) -> &str {
        &self.owner.login
    }
}

/// A single downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "browser_download_url")]
    pub download_url: String,
    #[serde(default)]
    pub size: u64,
}

impl Asset {
    /// Platform guessed from the asset name.
    pub fn platform(&self) -> Platform {
        Platform::classify(&self.name)
    }
}

/// A tagged publication of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Anything that can answer repository, release and asset queries.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Repositories matching `query`, best match first.
    async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>, SourceError>;

    /// Releases of `owner/repo`, newest first.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, SourceError>;

    /// Stream `asset` into `dest`, returning the number of bytes written.
    async fn download_asset(
        &self,
        repository: &Repository,
        asset: &Asset,
        dest: &Path,
    ) -> Result<u64, SourceError>;
}
