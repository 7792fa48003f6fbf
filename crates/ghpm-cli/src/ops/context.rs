//! Shared operation context.
//!
//! Groups the release source, filesystem layout and reporter that every
//! pipeline step needs, so they are not threaded through as separate
//! arguments.

use std::fmt;
use std::sync::Arc;

use ghpm_core::io::GitHubSource;
use ghpm_core::metadata::MetadataStore;
use ghpm_core::{Layout, Permissions, ReleaseSource, Reporter, Settings, SourceError};
use ghpm_schema::Platform;

#[derive(Clone)]
pub struct Context {
    pub source: Arc<dyn ReleaseSource>,
    pub layout: Layout,
    pub permissions: Permissions,
    /// Platforms acceptable for this host, most preferred first.
    pub preferences: Vec<Platform>,
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("layout", &self.layout)
            .field("permissions", &self.permissions)
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        layout: Layout,
        permissions: Permissions,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            source,
            layout,
            permissions,
            preferences: Platform::current().preferences(),
            reporter,
        }
    }

    /// Context talking to the GitHub API configured in `settings`.
    pub fn from_settings(
        settings: &Settings,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self, SourceError> {
        let source = GitHubSource::from_settings(settings)?;
        Ok(Self::new(
            Arc::new(source),
            settings.layout.clone(),
            settings.permissions,
            reporter,
        ))
    }

    pub fn metadata_store(&self) -> MetadataStore {
        MetadataStore::new(self.layout.metadata.clone(), self.permissions.downloads)
    }
}
