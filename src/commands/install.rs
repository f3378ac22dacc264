use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use super::scheduler::FeatureSet;
use crate::cli::{GlobalOpts, InstallOpts};
use crate::features::Context;
use crate::logging::Logger;
use crate::validator;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the selection is invalid, setup fails, a feature
/// fails, or the installed image does not validate.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let features = FeatureSet::from_selection(&opts.selection.features)?;

    let mut setup = CommandSetup::init(global, log)?;
    setup.system = setup.system.with_force_reinstall(opts.force);
    if let Some(archive) = &opts.framework_archive {
        setup.config = setup.config.with_framework_archive(archive.clone());
    }
    let ctx = setup
        .into_context(Arc::clone(log))
        .with_dry_run(opts.selection.dry_run);

    apply(&features, &ctx, log, !opts.skip_validation)
}

/// Apply `features`, print the summary, then validate unless told not to.
///
/// Validation is skipped on dry runs.
///
/// # Errors
///
/// Returns the first feature failure or the aggregated validation failures.
pub fn apply(features: &FeatureSet, ctx: &Context, log: &Logger, validate: bool) -> Result<()> {
    log.info(&format!("features: {}", features.names().join(", ")));
    if ctx.force() {
        log.info("force reinstall: idempotency checks bypassed");
    }

    let result = features.apply_features(ctx);
    log.print_summary();
    result?;

    if validate && !ctx.dry_run {
        log.stage("Validating");
        validator::validate(features, ctx)?;
    }
    Ok(())
}
