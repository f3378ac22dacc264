//! Post-install checks that the image has what a Kairos boot needs.
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::commands::scheduler::FeatureSet;
use crate::features::Context;
use crate::features::immutability::Immutability;
use crate::features::initrd::Initrd;
use crate::features::kernel::Kernel;

/// Binaries that must be on `PATH` after the immutability feature.
pub const REQUIRED_BINARIES: &[&str] = &["immucore", "kairos-agent"];

/// One of these must be on `PATH`; the name differs between families.
pub const GRUB_INSTALLERS: &[&str] = &["grub-install", "grub2-install"];

/// A single failed check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required binary is not on `PATH`.
    #[error("{feature}: binary '{binary}' not found on PATH")]
    MissingBinary {
        /// Feature that provides it.
        feature: String,
        /// Binary name, or alternatives joined by `|`.
        binary: String,
    },

    /// A required file does not exist.
    #[error("{feature}: {} does not exist", path.display())]
    MissingFile {
        /// Feature that creates it.
        feature: String,
        /// Expected path.
        path: PathBuf,
    },
}

/// Every check that failed in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation check(s) failed", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// The individual failures.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

/// Directories searched when validating an image that is not the host.
const IMAGE_PATH: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

fn on_path(ctx: &Context, binary: &str) -> bool {
    let layout = ctx.layout();
    if layout.root() == Path::new("/") {
        return ctx.executor.which(binary);
    }
    IMAGE_PATH
        .iter()
        .any(|dir| layout.path(dir).join(binary).is_file())
}

fn check_binaries(ctx: &Context, errors: &mut Vec<ValidationError>) {
    for binary in REQUIRED_BINARIES {
        if !on_path(ctx, binary) {
            errors.push(ValidationError::MissingBinary {
                feature: Immutability::NAME.to_string(),
                binary: (*binary).to_string(),
            });
        }
    }
    if !GRUB_INSTALLERS.iter().any(|b| on_path(ctx, b)) {
        errors.push(ValidationError::MissingBinary {
            feature: Immutability::NAME.to_string(),
            binary: GRUB_INSTALLERS.join("|"),
        });
    }
}

fn check_file(feature: &str, path: PathBuf, errors: &mut Vec<ValidationError>) {
    if std::fs::symlink_metadata(&path).is_err() {
        errors.push(ValidationError::MissingFile {
            feature: feature.to_string(),
            path,
        });
    }
}

/// Check the results of `features` on the context's root.
///
/// Features without checks are ignored.
///
/// # Errors
///
/// Returns every failed check at once.
pub fn validate(features: &FeatureSet, ctx: &Context) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    let layout = ctx.layout();

    if features.contains(Immutability::NAME) {
        check_binaries(ctx, &mut errors);
    }
    if features.contains(Kernel::NAME) {
        check_file(Kernel::NAME, layout.kernel_link(), &mut errors);
    }
    if features.contains(Initrd::NAME) {
        check_file(Initrd::NAME, layout.initrd(), &mut errors);
    }

    if errors.is_empty() {
        ctx.log
            .info(&format!("validated: {}", features.names().join(", ")));
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
