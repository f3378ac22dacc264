use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use super::scheduler::FeatureSet;
use crate::cli::{GlobalOpts, ValidateOpts};
use crate::logging::Logger;
use crate::validator;

/// Run the validate command.
///
/// # Errors
///
/// Returns an error if the selection is invalid, setup fails, or any check
/// fails.
pub fn run(global: &GlobalOpts, opts: &ValidateOpts, log: &Arc<Logger>) -> Result<()> {
    let features = FeatureSet::from_selection(&opts.features)?;
    let ctx = CommandSetup::init(global, log)?.into_context(Arc::clone(log));

    log.stage("Validating");
    validator::validate(&features, &ctx)?;
    Ok(())
}
