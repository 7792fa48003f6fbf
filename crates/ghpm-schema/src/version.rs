//! Package specifiers and loosely-structured release versions.
//!
//! Supports:
//! - Name only: `ripgrep` (owner and repo are both `ripgrep`)
//! - Owner and repo: `BurntSushi/ripgrep`
//! - With version: `BurntSushi/ripgrep@v14.1.0`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a [`PackageSpec`] or [`Version`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The specifier is empty or has an empty owner/repo part.
    #[error("Invalid package specifier '{0}': missing package name")]
    MissingName(String),

    /// More than one `@` separator.
    #[error("Invalid package specifier '{0}': name can't contain more than one '@'")]
    TooManyAt(String),

    /// More than one `/` separator.
    #[error("Invalid package specifier '{0}': name can't contain more than one '/'")]
    TooManySlashes(String),

    /// A numeric version component failed to parse.
    #[error("Invalid {component} version in '{version}'")]
    Component {
        /// Which component failed (`major`, `minor` or `patch`).
        component: &'static str,
        /// The full version string being parsed.
        version: String,
    },
}

/// Numeric parts of a version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// Major version.
    pub major: u64,
    /// Minor version, if the tag has one.
    pub minor: Option<u64>,
    /// Patch version, if the tag has one.
    pub patch: Option<u64>,
    /// Pre-release or build suffix, without the leading separator.
    pub suffix: String,
}

/// A release version: the raw tag plus optionally parsed components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// The tag exactly as published (e.g. `v1.2.3-rc.1`).
    pub value: String,
    /// Parsed components, or `None` when the version was recorded raw.
    pub components: Option<Components>,
}

impl Version {
    /// A version carrying only its raw value.
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            components: None,
        }
    }

    /// Parse a tag like `v1.2.3-beta+build`.
    ///
    /// An empty string yields a raw, empty version. A leading `v` is ignored;
    /// the text after the first `-` or `+` becomes the suffix.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Component`] if major, minor or patch is not a
    /// number.
    pub fn parse(value: &str) -> Result<Self, SpecError> {
        if value.is_empty() {
            return Ok(Self::raw(value));
        }

        let trimmed = value.strip_prefix('v').unwrap_or(value);
        let (main, suffix) = match trimmed.find(['-', '+']) {
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => (trimmed, ""),
        };

        let mut parts = main.split('.');
        let number = |component: &'static str, part: &str| {
            part.parse::<u64>().map_err(|_| SpecError::Component {
                component,
                version: value.to_string(),
            })
        };

        let major = number("major", parts.next().unwrap_or_default())?;
        let minor = parts.next().map(|p| number("minor", p)).transpose()?;
        let patch = parts.next().map(|p| number("patch", p)).transpose()?;

        Ok(Self {
            value: value.to_string(),
            components: Some(Components {
                major,
                minor,
                patch,
                suffix: suffix.to_string(),
            }),
        })
    }

    /// Get the raw version string.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether no version was given.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Identity of a package as requested by the user: `owner/repo[@version]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name. Installed packages are keyed by this.
    pub repo: String,
    /// Requested version; empty when none was given.
    pub version: Version,
}

impl PackageSpec {
    /// Parse a specifier like `ripgrep`, `BurntSushi/ripgrep` or
    /// `BurntSushi/ripgrep@14.1.0`.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the name has more than one `@` or `/`, an
    /// empty owner/repo, or an unparsable version.
    pub fn parse(spec: &str) -> Result<Self, SpecError> {
        let mut at_parts = spec.split('@');
        let name = at_parts.next().unwrap_or_default();
        let version = at_parts.next().unwrap_or_default();
        if at_parts.next().is_some() {
            return Err(SpecError::TooManyAt(spec.to_string()));
        }

        let mut slash_parts = name.split('/');
        let owner = slash_parts.next().unwrap_or_default();
        let repo = slash_parts.next().unwrap_or(owner);
        if slash_parts.next().is_some() {
            return Err(SpecError::TooManySlashes(spec.to_string()));
        }
        if owner.is_empty() || repo.is_empty() {
            return Err(SpecError::MissingName(spec.to_string()));
        }

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            version: Version::parse(version)?,
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if !self.version.is_empty() {
            write!(f, "@{}", self.version)?;
        }
        Ok(())
    }
}
