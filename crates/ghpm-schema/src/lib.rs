//! Shared types and on-disk formats for ghpm.
//!
//! Everything here is pure data: platform classification, package
//! specifiers and the installed-package metadata record. Side effects live in
//! `ghpm-core`.

pub mod metadata;
pub mod platform;
pub mod version;

// Re-exports
pub use metadata::{Installation, Metadata, PackageRecord};
pub use platform::{ARCH_TOKENS, Arch, OS_TOKENS, Os, Platform};
pub use version::{Components, PackageSpec, SpecError, Version};

/// Suffixes of asset names that are unpacked as gzip-compressed tarballs.
pub const TAR_GZ_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

/// Whether an asset name denotes a gzip-compressed tarball.
///
/// ```
/// assert!(ghpm_schema::is_tar_gz("tool-linux-x64.TAR.GZ"));
/// assert!(!ghpm_schema::is_tar_gz("tool-linux-x64"));
/// ```
pub fn is_tar_gz(name: &str) -> bool {
    let lower = name.to_lowercase();
    TAR_GZ_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
