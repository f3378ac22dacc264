//! Strips per-build state from the image: machine identity, package caches
//! and kernels other than the pinned one.
use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::kernel::{is_current, kernel_images};
use super::{Context, Feature};
use crate::resources::fs::{ensure_parent_dir, remove_path};

/// Paths removed from every image.
pub const FILES_TO_REMOVE: &[&str] = &[
    "/var/lib/dbus/machine-id",
    "/etc/hostname",
    "/var/lib/apt/lists",
    "/var/cache/dnf",
    "/var/cache/zypp",
    "/var/cache/apk",
    "/var/cache/pacman/pkg",
];

/// Cleans the image before it is sealed.
#[derive(Debug, Clone, Copy)]
pub struct Cleanup;

impl Cleanup {
    /// Feature name.
    pub const NAME: &'static str = "cleanup";
}

fn truncate(path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, "").with_context(|| format!("truncating {}", path.display()))
}

impl Feature for Cleanup {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        10
    }

    fn installed(&self, _ctx: &Context) -> bool {
        false
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let layout = ctx.layout();

        truncate(&layout.machine_id())?;
        ctx.log.debug("machine-id truncated");

        for path in FILES_TO_REMOVE {
            if remove_path(&layout.path(path))? {
                ctx.log.debug(&format!("removed {path}"));
            }
        }

        let link = layout.kernel_link();
        if fs::symlink_metadata(&link).is_err() {
            ctx.log.warn(&format!(
                "{} not found, keeping every kernel image",
                link.display()
            ));
            return Ok(());
        }
        let link_target = fs::read_link(&link).ok();

        let mut pruned = 0u32;
        for image in kernel_images(&layout.boot_dir())? {
            if is_current(&image, &link, link_target.as_deref()) {
                ctx.log
                    .debug(&format!("keeping current kernel {}", image.display()));
                continue;
            }
            remove_path(&image)?;
            ctx.log.info(&format!("removed kernel {}", image.display()));
            pruned += 1;
        }
        ctx.log.info(&format!("{pruned} stale kernels removed"));
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        format!(
            "Empties {}, removes caches ({}) and every kernel image except {}.",
            ctx.layout().machine_id().display(),
            FILES_TO_REMOVE.join(", "),
            ctx.layout().kernel_link().display()
        )
    }
}
