//! Idempotent resource primitives (check + apply pattern).
pub mod error;
pub mod file;
pub mod fs;
pub mod hardlink;
pub mod package;
pub mod systemd_unit;

use anyhow::Result;

/// State of a resource on the target root.
///
/// # Examples
///
/// ```
/// use kairos_init::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// assert_ne!(missing, correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g. its source is missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying or removing a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated or removed.
    Applied,
    /// Resource was already in the requested state.
    AlreadyCorrect,
}

/// A resource that can inspect itself and converge to a desired state.
pub trait Resource {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Inspect the resource without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;

    /// Converge the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied.
    fn apply(&self) -> Result<ResourceChange>;

    /// Undo a previous [`apply`](Self::apply).
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails or is not supported.
    fn remove(&self) -> Result<ResourceChange> {
        Err(error::ResourceError::UnsupportedOperation {
            operation: "remove".to_string(),
            resource: self.description(),
        }
        .into())
    }

    /// `true` when [`current_state`](Self::current_state) is `Correct`.
    fn is_correct(&self) -> bool {
        matches!(self.current_state(), Ok(ResourceState::Correct))
    }
}
