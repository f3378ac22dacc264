use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ShowOpts};
use crate::error::SelectionError;
use crate::features::{BuiltinFeature, Context, Feature};
use crate::logging::Logger;

/// Run the show command.
///
/// # Errors
///
/// Returns an error if the feature is unknown or setup fails.
pub fn run(global: &GlobalOpts, opts: &ShowOpts, log: &Arc<Logger>) -> Result<()> {
    let feature = lookup(&opts.feature)?;
    let ctx = CommandSetup::init(global, log)?.into_context(Arc::clone(log));
    println!("{}", describe(&feature, &ctx));
    Ok(())
}

/// Resolve a single feature name.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownFeature`] if no builtin feature matches.
pub fn lookup(name: &str) -> Result<BuiltinFeature, SelectionError> {
    BuiltinFeature::from_name(name).ok_or_else(|| SelectionError::UnknownFeature {
        name: name.to_string(),
        known: BuiltinFeature::names().join(", "),
    })
}

/// Multi-line description of `feature` on the context's system.
#[must_use]
pub fn describe(feature: &dyn Feature, ctx: &Context) -> String {
    let state = if feature.installed(ctx) {
        "installed"
    } else {
        "not installed"
    };
    format!(
        "{name} (order {order}, {state})\n  packages: {packages}\n  services: {services}\n  {info}",
        name = feature.name(),
        order = feature.order(),
        packages = if feature.installs_packages() { "yes" } else { "no" },
        services = if feature.has_services() { "yes" } else { "no" },
        info = feature.info(ctx),
    )
}
