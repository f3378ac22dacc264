use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::exec::Executor;

/// A systemd unit that should not run on the provisioned image.
#[derive(Debug, Clone)]
pub struct SystemdUnitResource {
    /// Unit name (e.g. "systemd-pcrlock-make-policy").
    pub name: String,
    /// Image root passed to `systemctl --root`; `None` acts on the host.
    pub root: Option<PathBuf>,
}

impl SystemdUnitResource {
    /// Create a new systemd unit resource.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
        }
    }

    /// Operate on the image at `root` instead of the running system.
    ///
    /// A root of `/` is the running system and adds no flag.
    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        self.root = (root != Path::new("/")).then(|| root.to_path_buf());
        self
    }

    /// `systemctl disable <unit>`.
    ///
    /// # Errors
    ///
    /// Returns an error if `systemctl` cannot run or reports failure.
    pub fn disable(&self, executor: &dyn Executor) -> Result<()> {
        self.systemctl(executor, "disable")
    }

    /// `systemctl mask <unit>`.
    ///
    /// # Errors
    ///
    /// Returns an error if `systemctl` cannot run or reports failure.
    pub fn mask(&self, executor: &dyn Executor) -> Result<()> {
        self.systemctl(executor, "mask")
    }

    fn systemctl(&self, executor: &dyn Executor, verb: &str) -> Result<()> {
        let root = self.root.as_ref().map(|r| r.to_string_lossy());
        let mut args = vec![verb];
        if let Some(root) = &root {
            args.extend(["--root", root.as_ref()]);
        }
        args.push(&self.name);
        let result = executor.run_unchecked("systemctl", &args)?;
        if !result.success {
            bail!(
                "failed to {verb} {}: {}",
                self.name,
                result.stderr.trim()
            );
        }
        Ok(())
    }
}
