pub mod extract;
pub mod github;

pub use extract::{ExtractError, extract_tar_gz, place_binary};
pub use github::GitHubSource;
