//! Generates `/boot/initrd` for the linked kernel with dracut.
use anyhow::{Context as _, Result};

use super::kernel::{latest_kernel, linked_kernel};
use super::{Context, Feature};
use crate::resources::fs::remove_path;

/// Builds the initrd.
#[derive(Debug, Clone, Copy)]
pub struct Initrd;

impl Initrd {
    /// Feature name.
    pub const NAME: &'static str = "initrd";
}

impl Feature for Initrd {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        5
    }

    fn installs_packages(&self) -> bool {
        true
    }

    fn installed(&self, ctx: &Context) -> bool {
        ctx.layout().initrd().exists()
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let version = match linked_kernel(ctx)? {
            Some(version) => version,
            None => {
                ctx.log.debug("no linked kernel, using the newest installed");
                latest_kernel(ctx)?
            }
        };
        let initrd = ctx.layout().initrd();
        let initrd = initrd.to_string_lossy();
        ctx.log
            .info(&format!("generating {initrd} for kernel {version}"));
        ctx.executor
            .run_logged("dracut", &["-v", "-f", &initrd, &version], &[])
            .context("generating initrd")
    }

    fn remove(&self, ctx: &Context) -> Result<()> {
        remove_path(&ctx.layout().initrd())?;
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        format!(
            "Runs dracut to generate {} for the kernel {} points at.",
            ctx.layout().initrd().display(),
            ctx.layout().kernel_link().display()
        )
    }
}
