//! Target system description: distro, family, version and architecture.
mod detect;

pub use detect::{detect, detect_from_values};

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Individual distributions, for when package names or tooling differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Distro {
    /// Detection failed or the distro is not supported.
    #[serde(rename = "unknown")]
    Unknown,
    /// Debian.
    #[serde(rename = "debian")]
    Debian,
    /// Ubuntu.
    #[serde(rename = "ubuntu")]
    Ubuntu,
    /// Red Hat Enterprise Linux.
    #[serde(rename = "rhel")]
    RedHat,
    /// Rocky Linux.
    #[serde(rename = "rocky")]
    Rocky,
    /// AlmaLinux.
    #[serde(rename = "almalinux")]
    AlmaLinux,
    /// Fedora.
    #[serde(rename = "fedora")]
    Fedora,
    /// Arch Linux.
    #[serde(rename = "arch")]
    Arch,
    /// Alpine Linux.
    #[serde(rename = "alpine")]
    Alpine,
    /// openSUSE Leap.
    #[serde(rename = "opensuse-leap")]
    OpenSuseLeap,
    /// openSUSE Tumbleweed.
    #[serde(rename = "opensuse-tumbleweed")]
    OpenSuseTumbleweed,
}

impl Distro {
    /// Every known distro, `Unknown` excluded.
    pub const KNOWN: [Self; 10] = [
        Self::Debian,
        Self::Ubuntu,
        Self::RedHat,
        Self::Rocky,
        Self::AlmaLinux,
        Self::Fedora,
        Self::Arch,
        Self::Alpine,
        Self::OpenSuseLeap,
        Self::OpenSuseTumbleweed,
    ];

    /// The `os-release` `ID` for this distro.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Debian => "debian",
            Self::Ubuntu => "ubuntu",
            Self::RedHat => "rhel",
            Self::Rocky => "rocky",
            Self::AlmaLinux => "almalinux",
            Self::Fedora => "fedora",
            Self::Arch => "arch",
            Self::Alpine => "alpine",
            Self::OpenSuseLeap => "opensuse-leap",
            Self::OpenSuseTumbleweed => "opensuse-tumbleweed",
        }
    }

    /// Match an `os-release` `ID` value.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|d| d.as_str() == id)
    }

    /// The family this distro belongs to.
    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::Unknown => Family::Unknown,
            Self::Debian | Self::Ubuntu => Family::Debian,
            Self::RedHat | Self::Rocky | Self::AlmaLinux | Self::Fedora => Family::RedHat,
            Self::Arch => Family::Arch,
            Self::Alpine => Family::Alpine,
            Self::OpenSuseLeap | Self::OpenSuseTumbleweed => Family::Suse,
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic families that share tooling and conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Unknown family.
    Unknown,
    /// Debian and derivatives (apt).
    Debian,
    /// Red Hat and derivatives (dnf).
    RedHat,
    /// Arch Linux and derivatives (pacman).
    Arch,
    /// Alpine (apk).
    Alpine,
    /// SUSE (zypper).
    Suse,
}

impl Family {
    /// Lowercase family name as used in templates and the release file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Debian => "debian",
            Self::RedHat => "redhat",
            Self::Arch => "arch",
            Self::Alpine => "alpine",
            Self::Suse => "suse",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture, in the naming used by package tables and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// x86-64.
    Amd64,
    /// 64-bit ARM.
    Arm64,
}

impl Architecture {
    /// Architecture of the running binary, if supported.
    #[must_use]
    pub fn host() -> Option<Self> {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Map a Rust target arch (`x86_64`, `aarch64`) to an [`Architecture`].
    #[must_use]
    pub fn from_rust_arch(arch: &str) -> Option<Self> {
        match arch {
            "x86_64" => Some(Self::Amd64),
            "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// Lowercase architecture name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of the system being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDescriptor {
    /// Human-readable name (`PRETTY_NAME`), for logging only.
    pub name: String,
    /// Detected distribution.
    pub distro: Distro,
    /// Family the distribution belongs to.
    pub family: Family,
    /// Free-form version string (`VERSION_ID`).
    pub version: String,
    /// Target architecture.
    pub architecture: Architecture,
    /// Bypass every idempotency check.
    pub force_reinstall: bool,
}

impl SystemDescriptor {
    /// Build a descriptor for `distro`, deriving the family from it.
    #[must_use]
    pub fn new(distro: Distro, version: impl Into<String>, architecture: Architecture) -> Self {
        Self {
            name: String::new(),
            distro,
            family: distro.family(),
            version: version.into(),
            architecture,
            force_reinstall: false,
        }
    }

    /// Return a copy with `force_reinstall` set.
    #[must_use]
    pub const fn with_force_reinstall(mut self, force: bool) -> Self {
        self.force_reinstall = force;
        self
    }

    /// Parameters available to package-name templates.
    #[must_use]
    pub fn template_params(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("distro".to_string(), self.distro.to_string()),
            ("version".to_string(), self.version.clone()),
            ("arch".to_string(), self.architecture.to_string()),
            ("family".to_string(), self.family.to_string()),
        ])
    }
}

impl fmt::Display for SystemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.distro, self.version, self.family, self.architecture
        )
    }
}
