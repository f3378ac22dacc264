//! Layered package tables and the resolver that flattens them.
//!
//! A [`PackageTable`] maps `distro → architecture → constraint key` to an
//! ordered list of package-name templates. [`resolve`] walks several tables
//! in priority order and produces one deduplicated, expanded package list
//! for a [`SystemDescriptor`](crate::system::SystemDescriptor).
pub mod constraint;
mod resolver;
pub mod template;

pub use resolver::{ResolveError, resolve};

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::system::{Architecture, Distro};

/// The named tables shipped in `data/packages.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Packages named the same on every distro.
    Common,
    /// Distro base tooling.
    Base,
    /// Early-boot (immucore/dracut) requirements.
    Immucore,
    /// Kernel image packages.
    Kernel,
    /// Bootloader packages, usually architecture specific.
    Bootloader,
    /// systemd init-system packages.
    Systemd,
    /// OpenRC init-system packages.
    Openrc,
}

impl TableKind {
    /// Lowercase table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Base => "base",
            Self::Immucore => "immucore",
            Self::Kernel => "kernel",
            Self::Bootloader => "bootloader",
            Self::Systemd => "systemd",
            Self::Openrc => "openrc",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a package group: always applies, or applies to a version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKey {
    /// The `"common"` sentinel.
    Common,
    /// A semantic-version range expression.
    Range(String),
}

impl ConstraintKey {
    /// Classify a raw key.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == constraint::COMMON {
            Self::Common
        } else {
            Self::Range(raw.to_string())
        }
    }

    /// The key as written in the table.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Common => constraint::COMMON,
            Self::Range(expr) => expr,
        }
    }
}

/// One constraint key and the templates it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintEntry {
    /// When the packages apply.
    pub key: ConstraintKey,
    /// Package-name templates, in installer priority order.
    pub packages: Vec<String>,
}

/// A nested `distro → architecture → [constraint entries]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTable {
    name: String,
    entries: BTreeMap<Distro, BTreeMap<Architecture, Vec<ConstraintEntry>>>,
}

impl PackageTable {
    /// Create an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Table name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append `packages` under `key` for `distro`/`arch`.
    ///
    /// Repeated keys merge into the first entry with that key so declaration
    /// order is preserved.
    pub fn add<I, S>(&mut self, distro: Distro, arch: Architecture, key: &str, packages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = ConstraintKey::parse(key);
        let list = self
            .entries
            .entry(distro)
            .or_default()
            .entry(arch)
            .or_default();
        let packages = packages.into_iter().map(Into::into);
        if let Some(existing) = list.iter_mut().find(|e| e.key == key) {
            existing.packages.extend(packages);
        } else {
            list.push(ConstraintEntry {
                key,
                packages: packages.collect(),
            });
        }
    }

    /// Builder form of [`add`](Self::add).
    #[must_use]
    pub fn with<I, S>(mut self, distro: Distro, arch: Architecture, key: &str, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(distro, arch, key, packages);
        self
    }

    /// Entries for `distro`/`arch`, in declaration order.
    #[must_use]
    pub fn lookup(&self, distro: Distro, arch: Architecture) -> Option<&[ConstraintEntry]> {
        self.entries
            .get(&distro)
            .and_then(|by_arch| by_arch.get(&arch))
            .map(Vec::as_slice)
    }

    /// `true` if no distro has any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
