//! Flatten layered package tables into one install list.
use std::collections::HashSet;

use thiserror::Error;

use super::constraint::{self, Constraint, ConstraintError};
use super::template::{self, TemplateError};
use super::{ConstraintEntry, ConstraintKey, PackageTable};
use crate::system::SystemDescriptor;

/// Errors that abort package resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The system version is not usable for constraint matching.
    #[error("cannot resolve packages for {system}")]
    Version {
        /// Display form of the system.
        system: String,
        /// Underlying parse failure.
        #[source]
        source: ConstraintError,
    },

    /// A package-name template is malformed.
    #[error("cannot expand package '{package}' from table '{table}'")]
    Template {
        /// Raw template text.
        package: String,
        /// Table it came from.
        table: String,
        /// Underlying syntax error.
        #[source]
        source: TemplateError,
    },
}

/// Resolve `tables` (highest priority first) for `system`.
///
/// Within each table the `common` group comes first, followed by matching
/// range groups in declaration order. Names are expanded, then deduplicated
/// keeping the first occurrence.
///
/// # Errors
///
/// Fails if the system version does not parse or a template is malformed.
/// Malformed constraint keys are logged and skipped.
pub fn resolve(
    system: &SystemDescriptor,
    tables: &[&PackageTable],
) -> Result<Vec<String>, ResolveError> {
    let version = constraint::parse_version(&system.version).map_err(|source| {
        ResolveError::Version {
            system: system.to_string(),
            source,
        }
    })?;
    let params = system.template_params();

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for table in tables {
        let Some(entries) = table.lookup(system.distro, system.architecture) else {
            tracing::trace!(
                "table '{}' has no entries for {}/{}",
                table.name(),
                system.distro,
                system.architecture
            );
            continue;
        };

        for entry in ordered(entries) {
            if !applies(table, entry, &version) {
                continue;
            }
            for raw in &entry.packages {
                let name =
                    template::expand(raw, &params).map_err(|source| ResolveError::Template {
                        package: raw.clone(),
                        table: table.name().to_string(),
                        source,
                    })?;
                if name.is_empty() {
                    tracing::warn!(
                        "package template '{raw}' in table '{}' expanded to nothing",
                        table.name()
                    );
                    continue;
                }
                if seen.insert(name.clone()) {
                    resolved.push(name);
                }
            }
        }
    }

    tracing::debug!("resolved {} packages for {system}", resolved.len());
    Ok(resolved)
}

/// `common` entries first, then ranges in declaration order.
fn ordered(entries: &[ConstraintEntry]) -> impl Iterator<Item = &ConstraintEntry> {
    let common = entries.iter().filter(|e| e.key == ConstraintKey::Common);
    let ranges = entries.iter().filter(|e| e.key != ConstraintKey::Common);
    common.chain(ranges)
}

fn applies(table: &PackageTable, entry: &ConstraintEntry, version: &semver::Version) -> bool {
    match &entry.key {
        ConstraintKey::Common => true,
        ConstraintKey::Range(expr) => match Constraint::parse(expr) {
            Ok(c) => c.matches(version),
            Err(e) => {
                tracing::warn!("skipping packages in table '{}': {e}", table.name());
                false
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::system::{Architecture, Distro};

    fn ubuntu(version: &str) -> SystemDescriptor {
        SystemDescriptor::new(Distro::Ubuntu, version, Architecture::Amd64)
    }

    #[test]
    fn common_and_matching_range() {
        let table = PackageTable::new("base")
            .with(Distro::Ubuntu, Architecture::Amd64, "common", ["curl"])
            .with(
                Distro::Ubuntu,
                Architecture::Amd64,
                ">=24.04",
                ["systemd-resolved"],
            );
        let pkgs = resolve(&ubuntu("24.04"), &[&table]).unwrap();
        assert_eq!(pkgs, ["curl", "systemd-resolved"]);
    }

    #[test]
    fn non_matching_range_is_excluded() {
        let table = PackageTable::new("base")
            .with(Distro::Ubuntu, Architecture::Amd64, "common", ["curl"])
            .with(
                Distro::Ubuntu,
                Architecture::Amd64,
                ">=24.04",
                ["systemd-resolved"],
            );
        let pkgs = resolve(&ubuntu("22.04"), &[&table]).unwrap();
        assert_eq!(pkgs, ["curl"]);
    }

    #[test]
    fn common_comes_first_within_a_table() {
        let table = PackageTable::new("base")
            .with(Distro::Ubuntu, Architecture::Amd64, ">=20.04", ["late"])
            .with(Distro::Ubuntu, Architecture::Amd64, "common", ["early"]);
        assert_eq!(resolve(&ubuntu("24.04"), &[&table]).unwrap(), ["early", "late"]);
    }

    #[test]
    fn tables_keep_priority_and_dedup_first_occurrence() {
        let common = PackageTable::new("common").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["curl", "tar"],
        );
        let base = PackageTable::new("base").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["gdisk", "curl", "gdisk"],
        );
        let pkgs = resolve(&ubuntu("24.04"), &[&common, &base]).unwrap();
        assert_eq!(pkgs, ["curl", "tar", "gdisk"]);
    }

    #[test]
    fn missing_distro_or_arch_is_skipped() {
        let table = PackageTable::new("bootloader").with(
            Distro::Ubuntu,
            Architecture::Arm64,
            "common",
            ["grub-efi-arm64"],
        );
        assert!(resolve(&ubuntu("24.04"), &[&table]).unwrap().is_empty());
    }

    #[test]
    fn templates_are_expanded_before_dedup() {
        let table = PackageTable::new("bootloader").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["grub-efi-{{.arch}}-bin", "grub-efi-amd64-bin"],
        );
        let pkgs = resolve(&ubuntu("24.04"), &[&table]).unwrap();
        assert_eq!(pkgs, ["grub-efi-amd64-bin"]);
    }

    #[test]
    fn empty_expansion_is_skipped() {
        let table = PackageTable::new("base").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["{{.flavor}}", "curl", "{{ .missing }}"],
        );
        assert_eq!(resolve(&ubuntu("24.04"), &[&table]).unwrap(), ["curl"]);
    }

    #[test]
    fn not_equal_constraint_selects_other_versions() {
        let table = PackageTable::new("base").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "!=22.04",
            ["systemd-resolved"],
        );
        assert_eq!(
            resolve(&ubuntu("24.04"), &[&table]).unwrap(),
            ["systemd-resolved"]
        );
        assert!(resolve(&ubuntu("22.04"), &[&table]).unwrap().is_empty());
    }

    #[test]
    fn malformed_constraint_is_skipped() {
        let table = PackageTable::new("base")
            .with(Distro::Ubuntu, Architecture::Amd64, ">=bogus", ["nope"])
            .with(Distro::Ubuntu, Architecture::Amd64, ">=20.04", ["yes"]);
        assert_eq!(resolve(&ubuntu("24.04"), &[&table]).unwrap(), ["yes"]);
    }

    #[test]
    fn invalid_version_aborts() {
        let table = PackageTable::new("common").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["curl"],
        );
        let err = resolve(&ubuntu("noble"), &[&table]).unwrap_err();
        assert!(matches!(err, ResolveError::Version { .. }));
    }

    #[test]
    fn bad_template_aborts() {
        let table = PackageTable::new("base").with(
            Distro::Ubuntu,
            Architecture::Amd64,
            "common",
            ["ok", "broken-{{.arch"],
        );
        let err = resolve(&ubuntu("24.04"), &[&table]).unwrap_err();
        assert!(
            matches!(&err, ResolveError::Template { package, .. } if package == "broken-{{.arch")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let table = PackageTable::new("base")
            .with(Distro::Ubuntu, Architecture::Amd64, "common", ["b", "a"])
            .with(Distro::Ubuntu, Architecture::Amd64, ">=22.04", ["d", "c"])
            .with(Distro::Ubuntu, Architecture::Amd64, ">=20.04", ["e"]);
        let first = resolve(&ubuntu("24.04"), &[&table]).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&ubuntu("24.04"), &[&table]).unwrap(), first);
        }
        assert_eq!(first, ["b", "a", "d", "c", "e"]);
    }
}
