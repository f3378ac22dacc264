use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use super::scheduler::FeatureSet;
use crate::cli::{FeatureOpts, GlobalOpts};
use crate::logging::Logger;

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if the selection is invalid, setup fails, or a feature
/// fails to remove.
pub fn run(global: &GlobalOpts, opts: &FeatureOpts, log: &Arc<Logger>) -> Result<()> {
    let features = FeatureSet::from_selection(&opts.features)?;
    let ctx = CommandSetup::init(global, log)?
        .into_context(Arc::clone(log))
        .with_dry_run(opts.dry_run);

    log.info(&format!("removing: {}", features.names().join(", ")));
    let result = features.remove_features(&ctx);
    log.print_summary();
    result?;
    Ok(())
}
