//! A file with fixed contents.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::fs::{ensure_parent_dir, remove_path};
use super::{Resource, ResourceChange, ResourceState};

/// A regular file whose contents are fully determined by the caller.
#[derive(Debug, Clone)]
pub struct FileResource {
    /// Destination path.
    pub path: PathBuf,
    /// Desired contents.
    pub contents: String,
}

impl FileResource {
    /// Create a new file resource.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

impl Resource for FileResource {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn current_state(&self) -> Result<ResourceState> {
        match fs::read_to_string(&self.path) {
            Ok(current) if current == self.contents => Ok(ResourceState::Correct),
            Ok(current) => Ok(ResourceState::Incorrect { current }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        ensure_parent_dir(&self.path)?;
        fs::write(&self.path, &self.contents)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if remove_path(&self.path)? {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::AlreadyCorrect)
        }
    }
}
