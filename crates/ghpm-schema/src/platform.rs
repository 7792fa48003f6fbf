//! Platform classification for release assets.
//!
//! Release asset names are free text, so the operating system and CPU
//! architecture are guessed from well-known substrings. The substrings live in
//! the [`OS_TOKENS`] and [`ARCH_TOKENS`] tables; classification walks them in
//! order and takes the first hit, which is why more specific tokens (`arm64`,
//! `ppc64le`, `x86_64`) sit above the tokens they contain (`arm`, `ppc64`,
//! `x86`).
//!
//! # Example
//!
//! ```
//! use ghpm_schema::{Arch, Os, Platform};
//!
//! let platform = Platform::classify("ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz");
//! assert_eq!(platform, Platform::new(Os::Linux, Arch::X64));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system axis of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux-based operating systems.
    Linux,
    /// Apple macOS (also published as `osx` or `darwin`).
    Mac,
    /// Microsoft Windows.
    Windows,
    /// No known token was found in the asset name.
    Unknown,
    /// Wildcard used in preferences: matches every classification.
    Any,
}

/// CPU architecture axis of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit Intel/AMD.
    X86,
    /// 64-bit Intel/AMD (`x86_64`, `amd64`).
    X64,
    /// 32-bit ARM.
    Arm,
    /// 64-bit ARM (`aarch64`).
    Arm64,
    /// 64-bit big-endian POWER.
    Ppc64,
    /// 64-bit little-endian POWER.
    Ppc64le,
    /// No known token was found in the asset name.
    Unknown,
    /// Wildcard used in preferences: matches every classification.
    Any,
}

/// Substrings that identify an operating system, checked in order.
///
/// `darwin` must be checked before `win`, which it contains.
pub const OS_TOKENS: &[(&str, Os)] = &[
    ("linux", Os::Linux),
    ("mac", Os::Mac),
    ("osx", Os::Mac),
    ("darwin", Os::Mac),
    ("win", Os::Windows),
];

/// Substrings that identify a CPU architecture, checked in order.
pub const ARCH_TOKENS: &[(&str, Arch)] = &[
    ("arm64", Arch::Arm64),
    ("aarch64", Arch::Arm64),
    ("arm", Arch::Arm),
    ("ppc64le", Arch::Ppc64le),
    ("ppc64", Arch::Ppc64),
    ("x64", Arch::X64),
    ("x86_64", Arch::X64),
    ("x86-64", Arch::X64),
    ("amd64", Arch::X64),
    ("x86", Arch::X86),
    ("i386", Arch::X86),
    ("i686", Arch::X86),
];

fn first_token<T: Copy>(name: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, value)| *value)
}

impl Os {
    /// Classify a lower-cased asset name.
    pub fn classify(lower_name: &str) -> Self {
        first_token(lower_name, OS_TOKENS).unwrap_or(Self::Unknown)
    }

    /// The operating system this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => Self::Linux,
            "macos" => Self::Mac,
            "windows" => Self::Windows,
            _ => Self::Unknown,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Windows => "windows",
            Self::Unknown => "unknown",
            Self::Any => "any",
        }
    }

    /// Whether an asset classified as `actual` satisfies this preference.
    pub fn accepts(self, actual: Self) -> bool {
        self == Self::Any || self == actual
    }
}

impl Arch {
    /// Classify a lower-cased asset name.
    pub fn classify(lower_name: &str) -> Self {
        first_token(lower_name, ARCH_TOKENS).unwrap_or(Self::Unknown)
    }

    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86,
            "x86_64" => Self::X64,
            "arm" => Self::Arm,
            "aarch64" => Self::Arm64,
            "powerpc64" if cfg!(target_endian = "little") => Self::Ppc64le,
            "powerpc64" => Self::Ppc64,
            _ => Self::Unknown,
        }
    }

    /// Architectures whose binaries also run on this one, best first.
    ///
    /// Only the x86 family has a fallback; everything else must match exactly.
    pub fn compatible(self) -> &'static [Arch] {
        match self {
            Self::X64 => &[Self::X86],
            _ => &[],
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X64 => "x64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Ppc64 => "ppc64",
            Self::Ppc64le => "ppc64le",
            Self::Unknown => "unknown",
            Self::Any => "any",
        }
    }

    /// Whether an asset classified as `actual` satisfies this preference.
    pub fn accepts(self, actual: Self) -> bool {
        self == Self::Any || self == actual
    }
}

/// An (operating system, architecture) pair.
///
/// Used both as the derived classification of an asset and as one tier of a
/// ranked preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Create a platform from its two axes.
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Classify an asset by name. Pure: the same name always yields the same
    /// platform, and axes without a recognised token are [`Os::Unknown`] /
    /// [`Arch::Unknown`].
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        Self {
            os: Os::classify(&lower),
            arch: Arch::classify(&lower),
        }
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::new(Os::current(), Arch::current())
    }

    /// Whether an asset classified as `actual` satisfies this preference.
    pub fn accepts(&self, actual: &Platform) -> bool {
        self.os.accepts(actual.os) && self.arch.accepts(actual.arch)
    }

    /// Ranked preferences for a host: the exact platform, then compatible
    /// architectures on the same OS, then same-OS assets with no recognisable
    /// architecture.
    pub fn preferences(&self) -> Vec<Platform> {
        let mut tiers = vec![*self];
        tiers.extend(
            self.arch
                .compatible()
                .iter()
                .map(|arch| Platform::new(self.os, *arch)),
        );
        tiers.push(Platform::new(self.os, Arch::Unknown));
        tiers
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
