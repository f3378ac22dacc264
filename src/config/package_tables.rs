//! Package tables loaded from `data/packages.toml`.
use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::toml_loader;
use crate::error::ConfigError;
use crate::packages::constraint::COMMON;
use crate::packages::{PackageTable, TableKind};
use crate::system::{Architecture, Distro};

const EMBEDDED: &str = include_str!("../../data/packages.toml");
const EMBEDDED_ORIGIN: &str = "embedded packages.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesFile {
    #[serde(default)]
    tables: Vec<TableSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableSpec {
    name: TableKind,
    #[serde(default)]
    entries: Vec<EntrySpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntrySpec {
    distros: Vec<Distro>,
    #[serde(default = "all_arches")]
    arches: Vec<Architecture>,
    #[serde(default = "common_key")]
    constraint: String,
    packages: Vec<String>,
}

fn all_arches() -> Vec<Architecture> {
    vec![Architecture::Amd64, Architecture::Arm64]
}

fn common_key() -> String {
    COMMON.to_string()
}

/// Every package table, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct PackageTables {
    tables: BTreeMap<TableKind, PackageTable>,
}

impl PackageTables {
    /// The tables compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded document is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(EMBEDDED, EMBEDDED_ORIGIN)
    }

    /// Load tables from a user-supplied file instead of the embedded data.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file: TablesFile = toml_loader::load_config(path)?;
        Self::from_file(file, &path.display().to_string())
    }

    /// Parse tables from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse, names an unknown
    /// distro or architecture, or contains an entry with no distros.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: TablesFile = toml_loader::parse(content, origin)?;
        Self::from_file(file, origin)
    }

    fn from_file(file: TablesFile, origin: &str) -> Result<Self, ConfigError> {
        let mut tables = Self::default();
        for spec in file.tables {
            let table = tables
                .tables
                .entry(spec.name)
                .or_insert_with(|| PackageTable::new(spec.name.as_str()));
            for entry in spec.entries {
                if entry.distros.is_empty() || entry.distros.contains(&Distro::Unknown) {
                    return Err(ConfigError::Invalid {
                        origin: origin.to_string(),
                        reason: format!(
                            "entry in table '{}' must list known distros",
                            spec.name
                        ),
                    });
                }
                for distro in &entry.distros {
                    for arch in &entry.arches {
                        table.add(*distro, *arch, &entry.constraint, entry.packages.iter().cloned());
                    }
                }
            }
        }
        Ok(tables)
    }

    /// Insert or replace a table.
    pub fn insert(&mut self, kind: TableKind, table: PackageTable) {
        self.tables.insert(kind, table);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, kind: TableKind, table: PackageTable) -> Self {
        self.insert(kind, table);
        self
    }

    /// Look up one table.
    #[must_use]
    pub fn get(&self, kind: TableKind) -> Option<&PackageTable> {
        self.tables.get(&kind)
    }

    /// Tables for `kinds`, in the given order; absent kinds are skipped.
    #[must_use]
    pub fn select(&self, kinds: &[TableKind]) -> Vec<&PackageTable> {
        kinds.iter().filter_map(|k| self.get(*k)).collect()
    }

    /// Number of loaded tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// `true` if no table is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::packages::ConstraintKey;

    #[test]
    fn embedded_tables_load() {
        let tables = PackageTables::embedded().unwrap();
        for kind in [
            TableKind::Common,
            TableKind::Base,
            TableKind::Immucore,
            TableKind::Kernel,
            TableKind::Bootloader,
            TableKind::Systemd,
            TableKind::Openrc,
        ] {
            assert!(tables.get(kind).is_some(), "missing table {kind}");
        }
    }

    #[test]
    fn embedded_tables_cover_every_known_distro() {
        let tables = PackageTables::embedded().unwrap();
        let kernel = tables.get(TableKind::Kernel).unwrap();
        for distro in Distro::KNOWN {
            for arch in [Architecture::Amd64, Architecture::Arm64] {
                assert!(
                    kernel.lookup(distro, arch).is_some(),
                    "no kernel packages for {distro}/{arch}"
                );
            }
        }
    }

    #[test]
    fn arches_default_to_both() {
        let tables = PackageTables::from_toml(
            r#"
[[tables]]
name = "kernel"
[[tables.entries]]
distros = ["arch"]
packages = ["linux"]
"#,
            "inline",
        )
        .unwrap();
        let kernel = tables.get(TableKind::Kernel).unwrap();
        assert!(kernel.lookup(Distro::Arch, Architecture::Amd64).is_some());
        assert!(kernel.lookup(Distro::Arch, Architecture::Arm64).is_some());
    }

    #[test]
    fn constraint_defaults_to_common_and_ranges_are_kept() {
        let tables = PackageTables::from_toml(
            r#"
[[tables]]
name = "base"
[[tables.entries]]
distros = ["ubuntu"]
arches = ["amd64"]
packages = ["curl"]
[[tables.entries]]
distros = ["ubuntu"]
arches = ["amd64"]
constraint = ">=24.04"
packages = ["systemd-resolved"]
"#,
            "inline",
        )
        .unwrap();
        let entries = tables
            .get(TableKind::Base)
            .unwrap()
            .lookup(Distro::Ubuntu, Architecture::Amd64)
            .unwrap();
        assert_eq!(entries[0].key, ConstraintKey::Common);
        assert_eq!(entries[1].key, ConstraintKey::Range(">=24.04".to_string()));
    }

    #[test]
    fn repeated_tables_merge() {
        let tables = PackageTables::from_toml(
            r#"
[[tables]]
name = "common"
[[tables.entries]]
distros = ["fedora"]
packages = ["a"]
[[tables]]
name = "common"
[[tables.entries]]
distros = ["fedora"]
packages = ["b"]
"#,
            "inline",
        )
        .unwrap();
        let entries = tables
            .get(TableKind::Common)
            .unwrap()
            .lookup(Distro::Fedora, Architecture::Amd64)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].packages, ["a", "b"]);
    }

    #[test]
    fn unknown_distro_is_a_load_error() {
        let err = PackageTables::from_toml(
            "[[tables]]\nname = \"base\"\n[[tables.entries]]\ndistros = [\"gentoo\"]\npackages = []\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_arch_is_a_load_error() {
        let err = PackageTables::from_toml(
            "[[tables]]\nname = \"base\"\n[[tables.entries]]\ndistros = [\"arch\"]\narches = [\"riscv64\"]\npackages = []\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn empty_distros_is_invalid() {
        let err = PackageTables::from_toml(
            "[[tables]]\nname = \"base\"\n[[tables.entries]]\ndistros = []\npackages = [\"x\"]\n",
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn select_skips_missing_kinds() {
        let tables = PackageTables::default().with(TableKind::Kernel, PackageTable::new("kernel"));
        let selected = tables.select(&[TableKind::Common, TableKind::Kernel]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "kernel");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.toml");
        std::fs::write(
            &path,
            "[[tables]]\nname = \"openrc\"\n[[tables.entries]]\ndistros = [\"alpine\"]\npackages = [\"openrc\"]\n",
        )
        .unwrap();
        let tables = PackageTables::load(&path).unwrap();
        assert_eq!(tables.len(), 1);
        assert!(!tables.is_empty());
    }
}
