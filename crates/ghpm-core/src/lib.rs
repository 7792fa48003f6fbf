pub mod io;
pub mod link;
pub mod metadata;
pub mod paths;
pub mod release;
pub mod reporter;
pub mod resolver;

pub use paths::{Layout, Permissions, Settings};
pub use release::{Asset, Release, ReleaseSource, Repository, SourceError};
pub use reporter::{NullReporter, Reporter};

/// User Agent string for requests to the release host
pub const USER_AGENT: &str = concat!("ghpm/", env!("CARGO_PKG_VERSION"));
