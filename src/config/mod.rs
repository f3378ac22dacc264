//! Run configuration: target-root layout and package data.
pub mod package_tables;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

pub use package_tables::PackageTables;

/// Version of the Kairos framework archive laid onto the image.
pub const FRAMEWORK_VERSION: &str = "v2.14.4";

/// Fixed paths of the image being provisioned, resolved against its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Layout rooted at `root` (`/` for the running system).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The target root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an absolute image path (`/etc/foo`) under the root.
    #[must_use]
    pub fn path(&self, absolute: &str) -> PathBuf {
        self.root.join(absolute.trim_start_matches('/'))
    }

    /// `/etc/kairos`.
    #[must_use]
    pub fn kairos_dir(&self) -> PathBuf {
        self.path("/etc/kairos")
    }

    /// Marker written once the immutability feature has completed.
    #[must_use]
    pub fn immutability_sentinel(&self) -> PathBuf {
        self.path("/etc/kairos/.immutability_installed")
    }

    /// `/etc/kairos-release`.
    #[must_use]
    pub fn release_file(&self) -> PathBuf {
        self.path("/etc/kairos-release")
    }

    /// `/etc/os-release`.
    #[must_use]
    pub fn os_release(&self) -> PathBuf {
        self.path("/etc/os-release")
    }

    /// `/etc/machine-id`.
    #[must_use]
    pub fn machine_id(&self) -> PathBuf {
        self.path("/etc/machine-id")
    }

    /// `/lib/modules`, one directory per installed kernel.
    #[must_use]
    pub fn modules_dir(&self) -> PathBuf {
        self.path("/lib/modules")
    }

    /// `/boot`.
    #[must_use]
    pub fn boot_dir(&self) -> PathBuf {
        self.path("/boot")
    }

    /// `/boot/vmlinuz`, the link to the selected kernel.
    #[must_use]
    pub fn kernel_link(&self) -> PathBuf {
        self.path("/boot/vmlinuz")
    }

    /// `/boot/vmlinuz-<version>`.
    #[must_use]
    pub fn kernel_image(&self, version: &str) -> PathBuf {
        self.boot_dir().join(format!("vmlinuz-{version}"))
    }

    /// `/boot/initrd`.
    #[must_use]
    pub fn initrd(&self) -> PathBuf {
        self.path("/boot/initrd")
    }

    /// `/overrides`, copied verbatim over the root.
    #[must_use]
    pub fn overrides_dir(&self) -> PathBuf {
        self.path("/overrides")
    }

    /// Default location of the framework archive.
    #[must_use]
    pub fn default_framework_archive(&self) -> PathBuf {
        self.path(&format!(
            "/usr/share/kairos/framework-{FRAMEWORK_VERSION}.tar"
        ))
    }
}

/// Everything a run needs besides the detected system.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target-root layout.
    pub layout: Layout,
    /// Package tables.
    pub tables: PackageTables,
    /// Framework archive to extract over the root.
    pub framework_archive: PathBuf,
}

impl Config {
    /// Build a configuration for `root`.
    ///
    /// Package tables come from `packages_file` when given, otherwise from
    /// the data compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the package data cannot be loaded.
    pub fn load(root: &Path, packages_file: Option<&Path>) -> Result<Self> {
        let tables = match packages_file {
            Some(path) => PackageTables::load(path)
                .with_context(|| format!("loading package tables from {}", path.display()))?,
            None => PackageTables::embedded().context("loading embedded package tables")?,
        };
        Ok(Self::new(Layout::new(root), tables))
    }

    /// Assemble a configuration from parts, with the default archive path.
    #[must_use]
    pub fn new(layout: Layout, tables: PackageTables) -> Self {
        let framework_archive = layout.default_framework_archive();
        Self {
            layout,
            tables,
            framework_archive,
        }
    }

    /// Override the framework archive path.
    #[must_use]
    pub fn with_framework_archive(mut self, path: PathBuf) -> Self {
        self.framework_archive = path;
        self
    }
}
