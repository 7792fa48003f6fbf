//! Info command

use anyhow::{Context, Result, bail};
use crossterm::style::Stylize;
use ghpm_core::io::GitHubSource;
use ghpm_core::{ReleaseSource, Settings};

use crate::ui::table::table;

/// Show details of the repository best matching `name` and its releases.
pub async fn info(settings: &Settings, name: &str) -> Result<()> {
    let source = GitHubSource::from_settings(settings).context("Failed to create GitHub client")?;
    let Some(repo) = source
        .search_repositories(name)
        .await
        .with_context(|| format!("Failed to search for '{name}'"))?
        .into_iter()
        .next()
    else {
        bail!("repository '{name}' not found");
    };

    let releases = source
        .list_releases(repo.owner(), &repo.name)
        .await
        .with_context(|| format!("Failed to list releases of '{}'", repo.full_name))?;

    let lw = 13;
    let or_none = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or("-").to_string();

    println!();
    println!("  {}", repo.full_name.as_str().white().bold());
    println!();
    println!("  {:<lw$}{}", "stars", repo.stars);
    println!("  {:<lw$}{}", "description", or_none(repo.description.as_deref()));
    println!("  {:<lw$}{}", "homepage", or_none(repo.homepage.as_deref()));
    println!("  {:<lw$}{}", "url", repo.html_url);
    println!("  {:<lw$}{}", "language", or_none(repo.language.as_deref()));
    println!("  {:<lw$}{}", "forks", repo.forks);
    if !repo.topics.is_empty() {
        println!("  {:<lw$}{}", "topics", repo.topics.join(", "));
    }
    println!();

    if releases.is_empty() {
        println!("  no releases");
        return Ok(());
    }

    let mut rows = table(&["version", "name", "url"]);
    for release in &releases {
        rows.add_row(vec![
            release.tag_name.clone(),
            release.name.clone().unwrap_or_default(),
            release.html_url.clone(),
        ]);
    }
    println!("{rows}");

    Ok(())
}
