//! Installs immucore, the kernel, the bootloader and the Kairos framework
//! files, then marks the image as immutable-ready.
use anyhow::{Context as _, Result};

use super::{Context, Feature};
use crate::packages::{ResolveError, TableKind, resolve};
use crate::resources::error::ResourceError;
use crate::resources::file::FileResource;
use crate::resources::fs::extract_tar;
use crate::resources::Resource;
use crate::system::{Distro, SystemDescriptor};

/// Provides everything needed to boot the image immutably.
#[derive(Debug, Clone, Copy)]
pub struct Immutability;

impl Immutability {
    /// Feature name.
    pub const NAME: &'static str = "immutability";
}

/// Tables merged for `system`, in priority order.
#[must_use]
pub fn table_kinds(system: &SystemDescriptor) -> [TableKind; 6] {
    let init = if system.distro == Distro::Alpine {
        TableKind::Openrc
    } else {
        TableKind::Systemd
    };
    [
        TableKind::Common,
        TableKind::Base,
        TableKind::Immucore,
        TableKind::Kernel,
        TableKind::Bootloader,
        init,
    ]
}

/// The expanded package list this feature installs.
///
/// # Errors
///
/// Returns an error if the system version does not parse or a package
/// template is malformed.
pub fn packages(ctx: &Context) -> Result<Vec<String>, ResolveError> {
    let tables = ctx.config.tables.select(&table_kinds(&ctx.system));
    resolve(&ctx.system, &tables)
}

impl Feature for Immutability {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        1
    }

    fn installs_packages(&self) -> bool {
        true
    }

    fn installed(&self, ctx: &Context) -> bool {
        ctx.layout().immutability_sentinel().exists()
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let packages = packages(ctx)?;
        if packages.is_empty() {
            ctx.log
                .warn(&format!("no packages resolved for {}", ctx.system));
        } else {
            ctx.log.info(&format!(
                "installing {} packages: {}",
                packages.len(),
                packages.join(" ")
            ));
            ctx.installer
                .install(&packages)
                .context("installing immutability packages")?;
        }

        let archive = &ctx.config.framework_archive;
        if !archive.is_file() {
            return Err(ResourceError::NotFound {
                resource: archive.display().to_string(),
            })
            .context("framework archive");
        }
        let layout = ctx.layout();
        extract_tar(archive, layout.root())?;
        ctx.log
            .info(&format!("framework extracted from {}", archive.display()));

        FileResource::new(layout.immutability_sentinel(), "")
            .apply()
            .context("writing immutability sentinel")?;
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        let summary = match packages(ctx) {
            Ok(list) if list.is_empty() => "no packages".to_string(),
            Ok(list) => list.join(" "),
            Err(e) => format!("packages unavailable: {e}"),
        };
        format!(
            "Installs immucore and the framework files to support immutability ({summary})."
        )
    }
}
