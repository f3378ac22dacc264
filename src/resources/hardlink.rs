//! Hard links, used to pin the boot kernel.
use std::fs;
use std::os::unix::fs::MetadataExt as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::error::ResourceError;
use super::fs::{ensure_parent_dir, remove_path};
use super::{Resource, ResourceChange, ResourceState};

/// `target` must be a hard link to `source`.
#[derive(Debug, Clone)]
pub struct HardLinkResource {
    /// Existing file to link to.
    pub source: PathBuf,
    /// Link path.
    pub target: PathBuf,
}

impl HardLinkResource {
    /// Create a new hard-link resource.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Whether `a` and `b` are the same inode on the same device.
///
/// # Errors
///
/// Returns an error if either path cannot be stat'ed.
pub fn same_file(a: &Path, b: &Path) -> Result<bool> {
    let ma = fs::metadata(a).with_context(|| format!("stat {}", a.display()))?;
    let mb = fs::metadata(b).with_context(|| format!("stat {}", b.display()))?;
    Ok(ma.dev() == mb.dev() && ma.ino() == mb.ino())
}

impl Resource for HardLinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn current_state(&self) -> Result<ResourceState> {
        if fs::symlink_metadata(&self.target).is_err() {
            return Ok(ResourceState::Missing);
        }
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} does not exist", self.source.display()),
            });
        }
        if same_file(&self.source, &self.target).unwrap_or(false) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: self.target.display().to_string(),
            })
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.source.exists() {
            return Err(ResourceError::NotFound {
                resource: self.source.display().to_string(),
            }
            .into());
        }
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        ensure_parent_dir(&self.target)?;
        remove_path(&self.target)?;
        fs::hard_link(&self.source, &self.target).with_context(|| {
            format!(
                "linking {} to {}",
                self.target.display(),
                self.source.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if remove_path(&self.target)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}
