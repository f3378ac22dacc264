//! `/etc/kairos-release`, the image's identity as shell-sourceable pairs.
use std::collections::BTreeMap;

use anyhow::{Context as _, Result};

use super::{Context, Feature};
use crate::resources::file::FileResource;
use crate::resources::{Resource, ResourceChange};

/// Writes the Kairos release file.
#[derive(Debug, Clone, Copy)]
pub struct Release;

impl Release {
    /// Feature name.
    pub const NAME: &'static str = "release";

    /// Release fields for the context's system, keyed and sorted by name.
    #[must_use]
    pub fn fields(ctx: &Context) -> BTreeMap<&'static str, String> {
        let system = &ctx.system;
        BTreeMap::from([
            ("KAIROS_ARCH", system.architecture.to_string()),
            ("KAIROS_FAMILY", system.family.to_string()),
            ("KAIROS_FLAVOR", system.distro.to_string()),
            ("KAIROS_MODEL", "generic".to_string()),
            ("KAIROS_VARIANT", "core".to_string()),
            ("KAIROS_VERSION", system.version.clone()),
        ])
    }

    /// Render the release file.
    #[must_use]
    pub fn render(ctx: &Context) -> String {
        Self::fields(ctx)
            .iter()
            .map(|(key, value)| format!("{key}=\"{}\"\n", escape(value)))
            .collect()
    }

    fn resource(ctx: &Context) -> FileResource {
        FileResource::new(ctx.layout().release_file(), Self::render(ctx))
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

impl Feature for Release {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        2
    }

    fn installed(&self, ctx: &Context) -> bool {
        ctx.layout().release_file().exists()
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let resource = Self::resource(ctx);
        let change = resource
            .apply()
            .with_context(|| format!("writing {}", resource.description()))?;
        if change == ResourceChange::AlreadyCorrect {
            ctx.log.debug("release file already up to date");
        } else {
            ctx.log.info(&format!("wrote {}", resource.description()));
        }
        Ok(())
    }

    fn remove(&self, ctx: &Context) -> Result<()> {
        if Self::resource(ctx).remove()? == ResourceChange::AlreadyCorrect {
            ctx.log.debug("release file already absent");
        }
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        format!(
            "Writes {} describing {} for the Kairos tooling.",
            ctx.layout().release_file().display(),
            ctx.system
        )
    }
}
