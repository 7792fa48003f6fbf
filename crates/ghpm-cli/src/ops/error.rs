//! Domain-specific errors for package operations

use std::fmt;
use std::path::PathBuf;

use ghpm_core::SourceError;
use ghpm_core::io::ExtractError;
use ghpm_core::link::PartialLinkError;
use ghpm_core::metadata::MetadataError;
use ghpm_core::resolver::ResolveError;
use ghpm_schema::SpecError;
use thiserror::Error;

/// Steps of an install, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    ResolvingAsset,
    Downloading,
    Unpacking,
    Symlinking,
    PersistingMetadata,
}

impl fmt::Display for InstallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResolvingAsset => "resolving asset",
            Self::Downloading => "downloading",
            Self::Unpacking => "unpacking",
            Self::Symlinking => "symlinking",
            Self::PersistingMetadata => "persisting metadata",
        })
    }
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("No repository found for '{0}'")]
    RepositoryNotFound(String),

    #[error("Repository '{0}' has no releases")]
    NoReleases(String),

    #[error("resolving asset failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("{stage} failed: {source}")]
    Source {
        stage: InstallStage,
        #[source]
        source: SourceError,
    },

    #[error("unpacking failed: {0}")]
    Unpack(#[from] ExtractError),

    #[error("{stage} failed at {path}: {source}")]
    Io {
        stage: InstallStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("symlinking failed: {0}")]
    Link(#[from] PartialLinkError),

    #[error("persisting metadata failed: {0}")]
    Metadata(#[from] MetadataError),
}

impl InstallError {
    /// The step that failed.
    pub fn stage(&self) -> InstallStage {
        match self {
            Self::RepositoryNotFound(_) | Self::NoReleases(_) | Self::Resolve(_) => {
                InstallStage::ResolvingAsset
            }
            Self::Source { stage, .. } | Self::Io { stage, .. } => *stage,
            Self::Unpack(_) => InstallStage::Unpacking,
            Self::Link(_) => InstallStage::Symlinking,
            Self::Metadata(_) => InstallStage::PersistingMetadata,
        }
    }
}

#[derive(Error, Debug)]
pub enum UninstallError {
    #[error("Invalid package name: {0}")]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_errors() {
        assert_eq!(
            InstallError::NoReleases("a/b".into()).stage(),
            InstallStage::ResolvingAsset
        );
        let io = InstallError::Io {
            stage: InstallStage::Downloading,
            path: PathBuf::from("/tmp/x"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(io.stage(), InstallStage::Downloading);
        assert_eq!(io.to_string(), "downloading failed at /tmp/x: disk full");
    }

    #[test]
    fn test_messages_name_the_stage() {
        let errors = [
            InstallError::from(ResolveError::NoAssetForPlatform {
                preferences: Vec::new(),
            }),
            InstallError::from(ExtractError::PathTraversal {
                entry: PathBuf::from("../evil"),
            }),
            InstallError::from(MetadataError::Io {
                path: PathBuf::from("/tmp/metadata"),
                source: std::io::Error::other("read-only"),
            }),
        ];
        for err in errors {
            let message = err.to_string();
            assert!(
                message.starts_with(&format!("{} failed: ", err.stage())),
                "{message}"
            );
        }
    }
}
