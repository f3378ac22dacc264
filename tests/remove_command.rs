#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `remove` command.

mod common;

use kairos_init::commands::scheduler::FeatureSet;
use kairos_init::logging::FeatureStatus;

use common::TestRootBuilder;

#[test]
fn install_then_remove_restores_root() {
    let root = TestRootBuilder::new().with_kernels(&["6.8.0"]).build();
    let set = FeatureSet::from_selection(&["release", "kernel"]).unwrap();
    let ctx = root.context();

    set.apply_features(&ctx).unwrap();
    set.remove_features(&ctx).unwrap();

    assert!(!root.layout().release_file().exists());
    assert!(!root.layout().kernel_link().exists());
    assert!(root.layout().kernel_image("6.8.0").exists());
    let statuses = root.statuses();
    assert_eq!(statuses[2], ("release".to_string(), FeatureStatus::Removed));
    assert_eq!(statuses[3], ("kernel".to_string(), FeatureStatus::Removed));
}

#[test]
fn removing_absent_features_succeeds() {
    let root = TestRootBuilder::new().build();

    FeatureSet::all().remove_features(&root.context()).unwrap();

    assert_eq!(root.statuses().len(), FeatureSet::all().len());
    assert!(
        root.statuses()
            .iter()
            .all(|(_, s)| *s == FeatureStatus::Removed)
    );
}

#[test]
fn dry_run_keeps_files() {
    let root = TestRootBuilder::new()
        .with_file("/etc/kairos-release", "KAIROS_FAMILY=\"debian\"\n")
        .build();
    let ctx = root.context().with_dry_run(true);

    FeatureSet::from_selection(&["release"])
        .unwrap()
        .remove_features(&ctx)
        .unwrap();

    assert!(root.layout().release_file().exists());
    assert_eq!(root.statuses()[0].1, FeatureStatus::DryRun);
}
