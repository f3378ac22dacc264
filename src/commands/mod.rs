pub mod install;
pub mod remove;
pub mod scheduler;
pub mod show;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::exec::{Executor, SystemExecutor};
use crate::features::Context;
use crate::logging::Logger;
use crate::resources::package::installer_for;
use crate::system::{self, SystemDescriptor};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates system detection and configuration loading so that each
/// command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected target system.
    pub system: SystemDescriptor,
    /// Layout and package tables.
    pub config: Config,
}

impl CommandSetup {
    /// Detect the target system and load the package tables.
    ///
    /// # Errors
    ///
    /// Returns an error if `os-release` cannot be read or the package data
    /// fails to load.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Detecting system");
        let config = Config::load(&global.root, global.packages.as_deref())?;
        let os_release = global
            .os_release
            .clone()
            .unwrap_or_else(|| config.layout.os_release());
        let system = system::detect(&os_release)?;
        log.info(&format!(
            "{} ({system})",
            if system.name.is_empty() {
                "unnamed system"
            } else {
                system.name.as_str()
            }
        ));
        log.debug(&format!("{} package tables loaded", config.tables.len()));
        log.debug(&format!("target root: {}", config.layout.root().display()));

        Ok(Self { system, config })
    }

    /// Build the feature context, running commands on the host.
    #[must_use]
    pub fn into_context(self, log: Arc<Logger>) -> Context {
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let installer = installer_for(self.system.family, Arc::clone(&executor));
        Context::new(self.system, Arc::new(self.config), executor, installer, log)
    }
}
