//! Package installation pipeline.
//!
//! `ResolvingAsset → Downloading → Unpacking → Symlinking → PersistingMetadata`.
//!
//! Each step that changes the filesystem registers a compensation before it
//! runs. When a later step fails the compensations run in reverse, so a
//! failed install leaves neither a package directory nor symlinks behind. A
//! package being reinstalled is moved aside rather than deleted and put back
//! on failure. The staged download is removed whatever the outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ghpm_core::io::extract::{create_dir_with_mode, extract_tar_gz, place_binary};
use ghpm_core::link::{ExistingLink, add_symlinks};
use ghpm_core::resolver::select_asset;
use ghpm_core::{Asset, Release, Repository, SourceError};
use ghpm_schema::{Metadata, is_tar_gz};
use tracing::Instrument;

use crate::ops::{Context, InstallError, InstallStage};

/// What a successful install did.
#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub repository: Repository,
    pub release: Release,
    pub asset: Asset,
    pub package_dir: PathBuf,
    pub metadata_path: PathBuf,
    /// Links created by this install.
    pub created: Vec<PathBuf>,
    /// Destinations that were already taken; tracked when they already point
    /// into this package.
    pub existing: Vec<ExistingLink>,
    /// Links recorded by the previous install that this one no longer exposes.
    pub stale: Vec<PathBuf>,
}

enum Compensation {
    RemoveLinks(Vec<PathBuf>),
    RemoveDir(PathBuf),
    RestoreDir { backup: PathBuf, original: PathBuf },
}

/// Undo log for one install.
#[derive(Default)]
struct Rollback {
    staged: Option<PathBuf>,
    steps: Vec<Compensation>,
}

fn remove_if_present(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

impl Rollback {
    fn push(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    fn discard_staged(&mut self, ctx: &Context) {
        let Some(staged) = self.staged.take() else {
            return;
        };
        if let Err(e) = remove_if_present(fs::remove_file(&staged)) {
            tracing::warn!(path = %staged.display(), error = %e, "failed to remove staged download");
            ctx.reporter.warning(&format!(
                "could not remove staged download {}: {e}",
                staged.display()
            ));
        }
    }

    fn run(self, ctx: &Context) {
        for step in self.steps.into_iter().rev() {
            let outcome = match &step {
                Compensation::RemoveLinks(links) => links
                    .iter()
                    .rev()
                    .try_for_each(|link| remove_if_present(fs::remove_file(link))),
                Compensation::RemoveDir(dir) => remove_if_present(fs::remove_dir_all(dir)),
                Compensation::RestoreDir { backup, original } => {
                    remove_if_present(fs::remove_dir_all(original))
                        .and_then(|()| fs::rename(backup, original))
                }
            };
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "rollback step failed");
                ctx.reporter.warning(&format!("cleanup incomplete: {e}"));
            }
        }
    }

    /// Forget the compensations once the install is durable; only the
    /// backup of a replaced package is still to be deleted.
    fn commit(self, ctx: &Context) {
        for step in self.steps {
            let Compensation::RestoreDir { backup, .. } = step else {
                continue;
            };
            if let Err(e) = remove_if_present(fs::remove_dir_all(&backup)) {
                tracing::warn!(path = %backup.display(), error = %e, "failed to remove previous package");
                ctx.reporter.warning(&format!(
                    "could not remove previous package {}: {e}",
                    backup.display()
                ));
            }
        }
    }
}

/// Install the newest release of the first repository matching `name`.
///
/// # Errors
///
/// Returns an [`InstallError`] naming the failed stage. By then every
/// filesystem change made by this install has been undone.
pub async fn install_package(ctx: &Context, name: &str) -> Result<InstallSummary, InstallError> {
    let span = tracing::info_span!("install", package = name);
    async move {
        let mut rollback = Rollback::default();
        let result = run(ctx, name, &mut rollback).await;
        rollback.discard_staged(ctx);

        match result {
            Ok(summary) => {
                rollback.commit(ctx);
                tracing::info!(
                    repository = %summary.repository.full_name,
                    tag = %summary.release.tag_name,
                    "installed"
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(stage = %e.stage(), error = %e, "install failed, rolling back");
                ctx.reporter.error(&format!("{} failed, rolling back", e.stage()));
                rollback.run(ctx);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn run(
    ctx: &Context,
    name: &str,
    rollback: &mut Rollback,
) -> Result<InstallSummary, InstallError> {
    let source_err =
        |stage: InstallStage| move |source: SourceError| InstallError::Source { stage, source };

    // Resolving
    let repository = ctx
        .source
        .search_repositories(name)
        .await
        .map_err(source_err(InstallStage::ResolvingAsset))?
        .into_iter()
        .next()
        .ok_or_else(|| InstallError::RepositoryNotFound(name.to_string()))?;

    let release = ctx
        .source
        .list_releases(repository.owner(), &repository.name)
        .await
        .map_err(source_err(InstallStage::ResolvingAsset))?
        .into_iter()
        .next()
        .ok_or_else(|| InstallError::NoReleases(repository.full_name.clone()))?;

    let asset = select_asset(&release.assets, &ctx.preferences)?.clone();
    ctx.reporter.info(&format!(
        "{} {} ({})",
        repository.full_name, release.tag_name, asset.name
    ));

    // Downloading
    let downloads = &ctx.layout.downloads;
    create_dir_with_mode(downloads, ctx.permissions.downloads).map_err(|source| {
        InstallError::Io {
            stage: InstallStage::Downloading,
            path: downloads.clone(),
            source,
        }
    })?;
    let staged = ctx.layout.staged_download(&asset.name);
    rollback.staged = Some(staged.clone());
    let bytes = ctx
        .source
        .download_asset(&repository, &asset, &staged)
        .await
        .map_err(source_err(InstallStage::Downloading))?;
    tracing::debug!(bytes, path = %staged.display(), "downloaded");

    // Unpacking
    let previous = previous_record(ctx, &repository.name);
    let package_dir = ctx.layout.package_dir(&repository.name);
    set_aside_existing(&package_dir, rollback)?;
    rollback.push(Compensation::RemoveDir(package_dir.clone()));

    let mode = ctx.permissions.downloads;
    if is_tar_gz(&asset.name) {
        extract_tar_gz(&staged, &package_dir, mode)?;
    } else {
        place_binary(&staged, &package_dir, &repository.name, mode)?;
    }

    // Symlinking
    let report = match add_symlinks(&package_dir, &ctx.layout.bin, ctx.permissions) {
        Ok(report) => report,
        Err(e) => {
            rollback.push(Compensation::RemoveLinks(e.created.clone()));
            return Err(e.into());
        }
    };
    rollback.push(Compensation::RemoveLinks(report.created.clone()));

    let mut tracked = report.created.clone();
    for existing in &report.existing {
        if existing.points_to_target() {
            tracked.push(existing.link.clone());
        } else {
            ctx.reporter.warning(&format!(
                "{} already exists and was not linked",
                existing.link.display()
            ));
        }
    }

    let stale: Vec<PathBuf> = previous
        .map(|record| {
            record
                .installation
                .symlinks
                .into_iter()
                .filter(|link| !tracked.contains(link))
                .collect()
        })
        .unwrap_or_default();
    for link in &stale {
        ctx.reporter.warning(&format!(
            "{} belonged to the previous install and was left in place",
            link.display()
        ));
    }

    // PersistingMetadata
    let metadata_path = ctx
        .metadata_store()
        .save(&package_dir, &repository, &release, &tracked)?;

    Ok(InstallSummary {
        repository,
        release,
        asset,
        package_dir,
        metadata_path,
        created: report.created,
        existing: report.existing,
        stale,
    })
}

/// The record of an earlier install of `repo`, if one is readable.
fn previous_record(ctx: &Context, repo: &str) -> Option<Metadata> {
    match ctx.metadata_store().find(repo) {
        Ok(found) => found.map(|(_, record)| record),
        Err(e) => {
            ctx.reporter
                .warning(&format!("ignoring unreadable previous record: {e}"));
            None
        }
    }
}

/// Move an existing package directory to a sibling backup so it can be
/// restored if the install fails.
fn set_aside_existing(package_dir: &Path, rollback: &mut Rollback) -> Result<(), InstallError> {
    if fs::symlink_metadata(package_dir).is_err() {
        return Ok(());
    }

    let file_name = package_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = package_dir.with_file_name(format!(".{file_name}.previous"));
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| InstallError::Io {
            stage: InstallStage::Unpacking,
            path,
            source,
        }
    };

    // leftover from an interrupted install
    remove_if_present(fs::remove_dir_all(&backup)).map_err(io_err(&backup))?;
    fs::rename(package_dir, &backup).map_err(io_err(package_dir))?;
    tracing::debug!(backup = %backup.display(), "set aside previous package");

    rollback.push(Compensation::RestoreDir {
        backup,
        original: package_dir.to_path_buf(),
    });
    Ok(())
}
