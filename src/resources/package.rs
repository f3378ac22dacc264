//! Package installation through the distro package manager.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use super::error::ResourceError;
use crate::exec::Executor;
use crate::system::Family;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian family.
    Apt,
    /// Red Hat family.
    Dnf,
    /// Arch Linux.
    Pacman,
    /// SUSE family.
    Zypper,
    /// Alpine.
    Apk,
}

impl PackageManager {
    /// The package manager used by `family`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedFamily`] for [`Family::Unknown`].
    pub fn for_family(family: Family) -> Result<Self, ResourceError> {
        match family {
            Family::Debian => Ok(Self::Apt),
            Family::RedHat => Ok(Self::Dnf),
            Family::Arch => Ok(Self::Pacman),
            Family::Suse => Ok(Self::Zypper),
            Family::Alpine => Ok(Self::Apk),
            Family::Unknown => Err(ResourceError::UnsupportedFamily {
                family: family.to_string(),
            }),
        }
    }

    /// Executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
        }
    }

    const fn refresh_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt => &["-y", "update"],
            Self::Dnf => &["-y", "makecache"],
            Self::Pacman => &["-Sy"],
            Self::Zypper => &["--non-interactive", "refresh"],
            Self::Apk => &["update"],
        }
    }

    const fn install_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt => &["-y", "--no-install-recommends", "install"],
            Self::Dnf => &["-y", "--setopt=install_weak_deps=False", "install"],
            Self::Pacman => &["-S", "--noconfirm", "--needed"],
            Self::Zypper => &["--non-interactive", "install", "--no-recommends"],
            Self::Apk => &["add", "--no-cache"],
        }
    }

    const fn remove_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt | Self::Dnf => &["-y", "remove"],
            Self::Pacman => &["-R", "--noconfirm"],
            Self::Zypper => &["--non-interactive", "remove"],
            Self::Apk => &["del"],
        }
    }

    const fn env(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Apt => &[("DEBIAN_FRONTEND", "noninteractive")],
            _ => &[],
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// Installs and removes packages. Implementations must accept an empty list.
#[cfg_attr(test, mockall::automock)]
pub trait Installer: Send + Sync {
    /// Install `packages` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager fails.
    fn install(&self, packages: &[String]) -> Result<()>;

    /// Remove `packages` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager fails.
    fn remove(&self, packages: &[String]) -> Result<()>;
}

/// [`Installer`] that drives a [`PackageManager`] through an [`Executor`].
///
/// The package index is refreshed once, before the first install.
pub struct PackageInstaller {
    manager: PackageManager,
    executor: Arc<dyn Executor>,
    refreshed: AtomicBool,
}

impl std::fmt::Debug for PackageInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageInstaller")
            .field("manager", &self.manager)
            .field("executor", &"<dyn Executor>")
            .field("refreshed", &self.refreshed)
            .finish()
    }
}

impl PackageInstaller {
    /// Create an installer for `manager`.
    #[must_use]
    pub const fn new(manager: PackageManager, executor: Arc<dyn Executor>) -> Self {
        Self {
            manager,
            executor,
            refreshed: AtomicBool::new(false),
        }
    }

    /// The package manager in use.
    #[must_use]
    pub const fn manager(&self) -> PackageManager {
        self.manager
    }

    fn invoke(&self, base: &[&str], packages: &[String]) -> Result<()> {
        let mut args: Vec<&str> = base.to_vec();
        args.extend(packages.iter().map(String::as_str));
        self.executor
            .run_logged(self.manager.program(), &args, self.manager.env())
    }
}

impl Installer for PackageInstaller {
    fn install(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        if !self.refreshed.swap(true, Ordering::SeqCst) {
            tracing::debug!("refreshing {} package index", self.manager);
            self.invoke(self.manager.refresh_args(), &[])?;
        }
        tracing::info!("installing {} packages with {}", packages.len(), self.manager);
        self.invoke(self.manager.install_args(), packages)
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        tracing::info!("removing {} packages with {}", packages.len(), self.manager);
        self.invoke(self.manager.remove_args(), packages)
    }
}

/// Stand-in for families without a package manager. Fails any non-empty
/// request.
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedInstaller {
    family: Family,
}

impl UnsupportedInstaller {
    fn refuse(self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        Err(ResourceError::UnsupportedFamily {
            family: self.family.to_string(),
        }
        .into())
    }
}

impl Installer for UnsupportedInstaller {
    fn install(&self, packages: &[String]) -> Result<()> {
        self.refuse(packages)
    }

    fn remove(&self, packages: &[String]) -> Result<()> {
        self.refuse(packages)
    }
}

/// The installer for `family`.
///
/// Unknown families get an [`UnsupportedInstaller`], so commands that never
/// install packages still work on them.
#[must_use]
pub fn installer_for(family: Family, executor: Arc<dyn Executor>) -> Arc<dyn Installer> {
    match PackageManager::for_family(family) {
        Ok(manager) => Arc::new(PackageInstaller::new(manager, executor)),
        Err(_) => Arc::new(UnsupportedInstaller { family }),
    }
}
