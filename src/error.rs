//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return typed errors while command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via `?`.
//!
//! ```text
//! ConfigError     package data loading
//! SelectionError  feature names given on the command line
//! SchedulerError  a feature failed to install or remove
//! ```
//!
//! Lower-level errors live next to the code that raises them:
//! [`ConstraintError`](crate::packages::constraint::ConstraintError),
//! [`TemplateError`](crate::packages::template::TemplateError),
//! [`ResolveError`](crate::packages::ResolveError),
//! [`ResourceError`](crate::resources::error::ResourceError) and
//! [`ValidationErrors`](crate::validator::ValidationErrors).
use thiserror::Error;

/// Boxed error carried by [`SchedulerError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that arise from loading package data.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a data file.
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML document is malformed or does not match the schema.
    #[error("invalid TOML in {origin}: {source}")]
    Parse {
        /// File name or description of the document.
        origin: String,
        /// Underlying deserialisation error.
        source: toml::de::Error,
    },

    /// The document parsed but describes something unusable.
    #[error("invalid package data in {origin}: {reason}")]
    Invalid {
        /// File name or description of the document.
        origin: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors in the user's feature selection. Raised before anything runs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// No feature names were given.
    #[error("no features selected")]
    Empty,

    /// A name does not match any registered feature.
    #[error("unknown feature '{name}': must be one of {known}")]
    UnknownFeature {
        /// The name as given.
        name: String,
        /// Comma-separated list of valid names.
        known: String,
    },
}

/// A feature failed while the scheduler was running it.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// `install` returned an error.
    #[error("feature '{feature}' failed to install")]
    Install {
        /// Name of the failing feature.
        feature: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },

    /// `remove` returned an error.
    #[error("feature '{feature}' failed to remove")]
    Remove {
        /// Name of the failing feature.
        feature: String,
        /// Underlying error.
        #[source]
        source: BoxError,
    },
}

impl SchedulerError {
    /// Name of the feature that failed.
    #[must_use]
    pub fn feature(&self) -> &str {
        match self {
            Self::Install { feature, .. } | Self::Remove { feature, .. } => feature,
        }
    }
}
