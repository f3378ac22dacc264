//! Core logging types: feature entries, status, and the [`Log`] trait.

/// Feature result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEntry {
    /// Feature name.
    pub name: String,
    /// Final status of the feature.
    pub status: FeatureStatus,
    /// Optional detail message (e.g. an error description).
    pub message: Option<String>,
}

/// Outcome of one feature in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    /// `install` completed.
    Installed,
    /// Skipped because `installed` reported true.
    AlreadyInstalled,
    /// Dry run; nothing was changed.
    DryRun,
    /// `remove` completed.
    Removed,
    /// The feature returned an error.
    Failed,
}

/// Abstraction over logging backends.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a feature result for the summary.
    fn record_feature(&self, name: &str, status: FeatureStatus, message: Option<&str>);
}
