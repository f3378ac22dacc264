#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for package resolution against hand-built and
//! embedded package tables.

use kairos_init::config::PackageTables;
use kairos_init::packages::{PackageTable, ResolveError, TableKind, resolve};
use kairos_init::system::{Architecture, Distro, SystemDescriptor};

fn ubuntu(version: &str) -> SystemDescriptor {
    SystemDescriptor::new(Distro::Ubuntu, version, Architecture::Amd64)
}

// ---------------------------------------------------------------------------
// Hand-built tables
// ---------------------------------------------------------------------------

#[test]
fn common_then_matching_range() {
    let table = PackageTable::new("base")
        .with(Distro::Ubuntu, Architecture::Amd64, "common", ["curl"])
        .with(
            Distro::Ubuntu,
            Architecture::Amd64,
            ">=24.04",
            ["systemd-resolved"],
        );

    assert_eq!(
        resolve(&ubuntu("24.04"), &[&table]).unwrap(),
        ["curl", "systemd-resolved"]
    );
    assert_eq!(resolve(&ubuntu("22.04"), &[&table]).unwrap(), ["curl"]);
}

#[test]
fn later_tables_do_not_reorder_earlier_packages() {
    let first = PackageTable::new("common").with(
        Distro::Ubuntu,
        Architecture::Amd64,
        "common",
        ["curl", "jq"],
    );
    let second = PackageTable::new("base").with(
        Distro::Ubuntu,
        Architecture::Amd64,
        "common",
        ["jq", "zstd", "curl"],
    );

    assert_eq!(
        resolve(&ubuntu("24.04"), &[&first, &second]).unwrap(),
        ["curl", "jq", "zstd"]
    );
}

#[test]
fn other_architecture_is_skipped() {
    let table = PackageTable::new("bootloader").with(
        Distro::Ubuntu,
        Architecture::Arm64,
        "common",
        ["grub-efi-arm64"],
    );
    assert!(resolve(&ubuntu("24.04"), &[&table]).unwrap().is_empty());
}

#[test]
fn malformed_constraint_is_skipped() {
    let table = PackageTable::new("base")
        .with(Distro::Ubuntu, Architecture::Amd64, "common", ["curl"])
        .with(Distro::Ubuntu, Architecture::Amd64, ">=>24", ["broken"]);
    assert_eq!(resolve(&ubuntu("24.04"), &[&table]).unwrap(), ["curl"]);
}

#[test]
fn unparsable_version_aborts() {
    let table =
        PackageTable::new("base").with(Distro::Ubuntu, Architecture::Amd64, "common", ["curl"]);
    let err = resolve(&ubuntu("noble"), &[&table]).unwrap_err();
    assert!(matches!(err, ResolveError::Version { .. }));
}

#[test]
fn resolution_is_deterministic() {
    let tables = PackageTables::embedded().unwrap();
    let selected = tables.select(&[TableKind::Common, TableKind::Base, TableKind::Bootloader]);
    let first = resolve(&ubuntu("24.04"), &selected).unwrap();
    for _ in 0..5 {
        assert_eq!(resolve(&ubuntu("24.04"), &selected).unwrap(), first);
    }
}

// ---------------------------------------------------------------------------
// Embedded tables
// ---------------------------------------------------------------------------

#[test]
fn embedded_tables_load_every_kind() {
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
fn embedded_ubuntu_noble_gets_resolved() {
    let tables = PackageTables::embedded().unwrap();
    let base = tables.select(&[TableKind::Base]);

    let noble = resolve(&ubuntu("24.04"), &base).unwrap();
    let jammy = resolve(&ubuntu("22.04"), &base).unwrap();

    assert!(noble.contains(&"systemd-resolved".to_string()));
    assert!(!jammy.contains(&"systemd-resolved".to_string()));
}

#[test]
fn embedded_templates_expand_architecture() {
    let tables = PackageTables::embedded().unwrap();
    let bootloader = tables.select(&[TableKind::Bootloader]);

    let amd64 = resolve(&ubuntu("24.04"), &bootloader).unwrap();
    assert!(amd64.contains(&"grub-efi-amd64-bin".to_string()));
    assert!(amd64.iter().all(|p| !p.contains("{{")));

    let arm64 = resolve(
        &SystemDescriptor::new(Distro::Ubuntu, "24.04", Architecture::Arm64),
        &bootloader,
    )
    .unwrap();
    assert!(arm64.contains(&"grub-efi-arm64-bin".to_string()));
}

#[test]
fn embedded_kernel_table_covers_every_distro() {
    let tables = PackageTables::embedded().unwrap();
    let kernel = tables.select(&[TableKind::Kernel]);
    for distro in Distro::KNOWN {
        for arch in [Architecture::Amd64, Architecture::Arm64] {
            let system = SystemDescriptor::new(distro, "1.0", arch);
            assert!(
                !resolve(&system, &kernel).unwrap().is_empty(),
                "no kernel package for {distro}/{arch}"
            );
        }
    }
}
