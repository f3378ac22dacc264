use std::sync::Arc;

use crate::config::{Config, Layout};
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::package::Installer;
use crate::system::SystemDescriptor;

/// Shared context for feature execution.
pub struct Context {
    /// The system being provisioned.
    pub system: SystemDescriptor,
    /// Layout, package tables and archive location.
    pub config: Arc<Config>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Package installer for the detected family.
    pub installer: Arc<dyn Installer>,
    /// Logger for output and feature recording.
    pub log: Arc<dyn Log>,
    /// Log what would happen instead of doing it.
    pub dry_run: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("system", &self.system)
            .field("config", &self.config)
            .field("executor", &"<dyn Executor>")
            .field("installer", &"<dyn Installer>")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Context {
    /// Creates a new context for feature execution.
    #[must_use]
    pub fn new(
        system: SystemDescriptor,
        config: Arc<Config>,
        executor: Arc<dyn Executor>,
        installer: Arc<dyn Installer>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            system,
            config,
            executor,
            installer,
            log,
            dry_run: false,
        }
    }

    /// Return a copy with `dry_run` set.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Target-root layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.config.layout
    }

    /// Whether idempotency checks are bypassed.
    #[must_use]
    pub const fn force(&self) -> bool {
        self.system.force_reinstall
    }
}
