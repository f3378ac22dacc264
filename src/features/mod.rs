//! Ordered, idempotent provisioning steps applied to the target root.
pub mod cleanup;
mod context;
pub mod immutability;
pub mod initrd;
pub mod kernel;
pub mod overrides;
pub mod release;
pub mod services;

pub use context::Context;

use anyhow::Result;

/// A named unit of provisioning work.
///
/// Features run in ascending [`order`](Feature::order). The scheduler calls
/// [`installed`](Feature::installed) first and skips the feature when it
/// returns `true`, unless the run forces a reinstall.
pub trait Feature: Send + Sync {
    /// Unique, lowercase feature name.
    fn name(&self) -> &str;

    /// Execution-order hint; lower runs earlier.
    fn order(&self) -> i32;

    /// Whether the feature touches init-system units.
    fn has_services(&self) -> bool {
        false
    }

    /// Whether the feature installs distro packages.
    fn installs_packages(&self) -> bool {
        false
    }

    /// Side-effect-free check for a previous successful install.
    fn installed(&self, ctx: &Context) -> bool;

    /// Perform the provisioning step.
    ///
    /// # Errors
    ///
    /// Returns an error if any part of the step fails. Nothing already done
    /// is rolled back.
    fn install(&self, ctx: &Context) -> Result<()>;

    /// Undo [`install`](Feature::install). The default does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn remove(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    /// Human-readable description of what the feature does on this system.
    fn info(&self, ctx: &Context) -> String;
}

/// The closed set of features shipped with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFeature {
    /// Packages, framework files and the immutability sentinel.
    Immutability,
    /// `/etc/kairos-release`.
    Release,
    /// `/boot/vmlinuz` link.
    Kernel,
    /// `/overrides` copied over the root.
    Overrides,
    /// `/boot/initrd` via dracut.
    Initrd,
    /// Disabled and masked units.
    Services,
    /// Machine identity, caches and stale kernels.
    Cleanup,
}

impl BuiltinFeature {
    /// Every builtin feature, in registration order.
    pub const ALL: [Self; 7] = [
        Self::Immutability,
        Self::Release,
        Self::Kernel,
        Self::Overrides,
        Self::Initrd,
        Self::Services,
        Self::Cleanup,
    ];

    /// Look up a feature by name, ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_feature().name().eq_ignore_ascii_case(name.trim()))
    }

    /// Every builtin feature as a boxed trait object.
    #[must_use]
    pub fn all() -> Vec<Box<dyn Feature>> {
        Self::ALL
            .into_iter()
            .map(|f| Box::new(f) as Box<dyn Feature>)
            .collect()
    }

    /// Names of every builtin feature, in registration order.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.static_name()).collect()
    }

    const fn static_name(self) -> &'static str {
        match self {
            Self::Immutability => immutability::Immutability::NAME,
            Self::Release => release::Release::NAME,
            Self::Kernel => kernel::Kernel::NAME,
            Self::Overrides => overrides::Overrides::NAME,
            Self::Initrd => initrd::Initrd::NAME,
            Self::Services => services::Services::NAME,
            Self::Cleanup => cleanup::Cleanup::NAME,
        }
    }

    fn as_feature(self) -> &'static dyn Feature {
        match self {
            Self::Immutability => &immutability::Immutability,
            Self::Release => &release::Release,
            Self::Kernel => &kernel::Kernel,
            Self::Overrides => &overrides::Overrides,
            Self::Initrd => &initrd::Initrd,
            Self::Services => &services::Services,
            Self::Cleanup => &cleanup::Cleanup,
        }
    }
}

impl Feature for BuiltinFeature {
    fn name(&self) -> &str {
        self.static_name()
    }

    fn order(&self) -> i32 {
        self.as_feature().order()
    }

    fn has_services(&self) -> bool {
        self.as_feature().has_services()
    }

    fn installs_packages(&self) -> bool {
        self.as_feature().installs_packages()
    }

    fn installed(&self, ctx: &Context) -> bool {
        self.as_feature().installed(ctx)
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        self.as_feature().install(ctx)
    }

    fn remove(&self, ctx: &Context) -> Result<()> {
        self.as_feature().remove(ctx)
    }

    fn info(&self, ctx: &Context) -> String {
        self.as_feature().info(ctx)
    }
}
