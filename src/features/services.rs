//! Disables and masks units that break a Kairos boot.
use anyhow::Result;

use super::{Context, Feature};
use crate::resources::systemd_unit::SystemdUnitResource;

/// Units disabled and masked on every image.
pub const MASKED_UNITS: &[&str] = &["systemd-pcrlock-make-policy"];

/// Masks unwanted init-system units.
#[derive(Debug, Clone, Copy)]
pub struct Services;

impl Services {
    /// Feature name.
    pub const NAME: &'static str = "services";
}

impl Feature for Services {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        6
    }

    fn has_services(&self) -> bool {
        true
    }

    // Nothing observable marks completion; only a forced run applies it.
    fn installed(&self, _ctx: &Context) -> bool {
        true
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        for name in MASKED_UNITS {
            let unit = SystemdUnitResource::new(*name).with_root(ctx.layout().root());
            match unit.disable(ctx.executor.as_ref()) {
                Ok(()) => ctx.log.debug(&format!("disabled: {name}")),
                Err(e) => ctx.log.warn(&format!("{e:#}")),
            }
            match unit.mask(ctx.executor.as_ref()) {
                Ok(()) => ctx.log.debug(&format!("masked: {name}")),
                Err(e) => ctx.log.warn(&format!("{e:#}")),
            }
        }
        Ok(())
    }

    fn info(&self, _ctx: &Context) -> String {
        format!("Disables and masks: {}.", MASKED_UNITS.join(", "))
    }
}
