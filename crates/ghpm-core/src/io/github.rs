//! GitHub REST client implementing [`ReleaseSource`].

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::paths::Settings;
use crate::release::{Asset, Release, ReleaseSource, Repository, SourceError};

const API_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

/// Release source backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubSource {
    pub fn new(client: Client, api_base: &str, token: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Client configured from the resolved settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SourceError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self::new(
            client,
            &settings.github_api,
            settings.github_token.clone(),
        ))
    }

    fn get(&self, path: &str, accept: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(format!("{}{path}", self.api_base))
            .header(USER_AGENT, crate::USER_AGENT)
            .header(ACCEPT, accept);
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        req
    }
}

#[async_trait]
impl ReleaseSource for GitHubSource {
    async fn search_repositories(&self, query: &str) -> Result<Vec<Repository>, SourceError> {
        tracing::debug!(query, "searching repositories");
        let resp: SearchResponse = self
            .get("/search/repositories", API_JSON)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.items)
    }

    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, SourceError> {
        tracing::debug!(owner, repo, "listing releases");
        let releases = self
            .get(&format!("/repos/{owner}/{repo}/releases"), API_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(releases)
    }

    async fn download_asset(
        &self,
        repository: &Repository,
        asset: &Asset,
        dest: &Path,
    ) -> Result<u64, SourceError> {
        let path = format!(
            "/repos/{}/{}/releases/assets/{}",
            repository.owner(),
            repository.name,
            asset.id
        );
        tracing::debug!(asset = %asset.name, dest = %dest.display(), "downloading asset");

        let response = self
            .get(&path, "application/octet-stream")
            .send()
            .await?
            .error_for_status()?;

        let io_err = |source: std::io::Error| SourceError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let mut file = File::create(dest).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;
        Ok(written)
    }
}
