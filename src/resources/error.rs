//! Typed error variants for resource operations.
//!
//! Internal resource code may return these variants directly; callers convert
//! to [`anyhow::Error`] via `?`.

use thiserror::Error;

/// Errors that arise from resource checks and apply operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// No package manager is known for the detected family.
    #[error("no package manager for family '{family}'")]
    UnsupportedFamily {
        /// Family name.
        family: String,
    },

    /// A required resource (file, archive, kernel) was not found.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// The requested operation is not supported for this resource type.
    #[error("operation '{operation}' is not supported for resource '{resource}'")]
    UnsupportedOperation {
        /// Name of the unsupported operation (e.g. `"remove"`).
        operation: String,
        /// Name or description of the resource.
        resource: String,
    },
}
