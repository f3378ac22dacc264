//! System detection from `/etc/os-release`.
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Architecture, Distro, SystemDescriptor};

/// Read `os_release` and describe the system it belongs to.
///
/// The architecture is that of the running binary.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the host
/// architecture is not supported.
pub fn detect(os_release: &Path) -> Result<SystemDescriptor> {
    let values = dotenvy::from_path_iter(os_release)
        .with_context(|| format!("reading {}", os_release.display()))?
        .collect::<Result<HashMap<String, String>, _>>()
        .with_context(|| format!("parsing {}", os_release.display()))?;
    tracing::trace!("os-release values: {values:?}");

    let arch = Architecture::host().with_context(|| {
        format!(
            "unsupported host architecture: {}",
            std::env::consts::ARCH
        )
    })?;

    let system = detect_from_values(&values, arch);
    tracing::debug!("detected system: {system}");
    Ok(system)
}

/// Build a [`SystemDescriptor`] from parsed `os-release` key/value pairs.
///
/// `ID` is matched first. Derivatives with their own `ID` fall back to the
/// first recognised word of `ID_LIKE`.
#[must_use]
pub fn detect_from_values(values: &HashMap<String, String>, arch: Architecture) -> SystemDescriptor {
    let distro = values
        .get("ID")
        .and_then(|id| Distro::from_id(id))
        .or_else(|| values.get("ID_LIKE").and_then(|like| distro_like(like)))
        .unwrap_or(Distro::Unknown);

    let name = values
        .get("PRETTY_NAME")
        .filter(|n| !n.is_empty())
        .or_else(|| values.get("NAME"))
        .cloned()
        .unwrap_or_default();

    let mut system = SystemDescriptor::new(
        distro,
        values.get("VERSION_ID").cloned().unwrap_or_default(),
        arch,
    );
    system.name = name;
    system
}

/// Map an `ID_LIKE` value onto the parent distro used for that family.
fn distro_like(id_like: &str) -> Option<Distro> {
    id_like.split_whitespace().find_map(|word| match word {
        "debian" | "ubuntu" => Some(Distro::Debian),
        "rhel" | "fedora" | "centos" => Some(Distro::Fedora),
        "arch" => Some(Distro::Arch),
        "suse" | "opensuse" => Some(Distro::OpenSuseLeap),
        _ => None,
    })
}
