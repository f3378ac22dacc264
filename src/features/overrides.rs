//! Copies `/overrides` over the target root.
use anyhow::{Context as _, Result};

use super::{Context, Feature};
use crate::resources::fs::overlay_tree;

/// Applies user-supplied file overrides.
#[derive(Debug, Clone, Copy)]
pub struct Overrides;

impl Overrides {
    /// Feature name.
    pub const NAME: &'static str = "overrides";
}

impl Feature for Overrides {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        4
    }

    // Overrides are cheap to reapply and carry no marker.
    fn installed(&self, _ctx: &Context) -> bool {
        false
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let layout = ctx.layout();
        let src = layout.overrides_dir();
        if !src.is_dir() {
            ctx.log
                .info(&format!("no overrides found at {}", src.display()));
            return Ok(());
        }
        let written = overlay_tree(&src, layout.root())
            .with_context(|| format!("applying overrides from {}", src.display()))?;
        ctx.log.info(&format!("{written} override files applied"));
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        let layout = ctx.layout();
        format!(
            "Copies the contents of {} over {}.",
            layout.overrides_dir().display(),
            layout.root().display()
        )
    }
}
