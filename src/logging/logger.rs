//! Structured logger with dry-run awareness and summary collection.
use std::sync::Mutex;

use super::types::{FeatureEntry, FeatureStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Target used for stage headers.
pub const STAGE_TARGET: &str = "kairos::stage";
/// Target used for dry-run actions.
pub const DRY_RUN_TARGET: &str = "kairos::dry_run";

/// Console logger that also collects per-feature results for the summary.
#[derive(Debug, Default)]
pub struct Logger {
    features: Mutex<Vec<FeatureEntry>>,
}

impl Logger {
    /// Create a new logger with an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a feature result for the summary.
    pub fn record_feature(&self, name: &str, status: FeatureStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.features.lock() {
            guard.push(FeatureEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// All recorded entries, in recording order.
    #[must_use]
    pub fn entries(&self) -> Vec<FeatureEntry> {
        self.features.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Return `true` if any recorded feature has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the number of failed features.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.features.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == FeatureStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded features.
    pub fn print_summary(&self) {
        let features = self.entries();
        if features.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut installed = 0u32;
        let mut already = 0u32;
        let mut dry_run = 0u32;
        let mut removed = 0u32;
        let mut failed = 0u32;

        for feature in &features {
            let (icon, color) = match feature.status {
                FeatureStatus::Installed => {
                    installed += 1;
                    ("✓", "\x1b[32m")
                }
                FeatureStatus::AlreadyInstalled => {
                    already += 1;
                    ("·", "\x1b[2m")
                }
                FeatureStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                FeatureStatus::Removed => {
                    removed += 1;
                    ("-", "\x1b[36m")
                }
                FeatureStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = feature
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", feature.name));
        }

        println!();
        let total = installed + already + dry_run + removed + failed;
        self.info(&format!(
            "{total} features: \x1b[32m{installed} installed\x1b[0m, \x1b[2m{already} already installed\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[36m{removed} removed\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_feature(&self, name: &str, status: FeatureStatus, message: Option<&str>) {
        self.record_feature(name, status, message);
    }
}
