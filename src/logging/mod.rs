//! Logging infrastructure: console subscriber and run summary.

mod logger;
mod subscriber;
mod types;

pub use logger::{DRY_RUN_TARGET, Logger, STAGE_TARGET};
pub use subscriber::init_subscriber;
pub use types::{FeatureEntry, FeatureStatus, Log};
