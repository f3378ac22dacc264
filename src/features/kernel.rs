//! Pins the boot kernel by hard-linking the newest image to `/boot/vmlinuz`.
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use semver::Version;

use super::{Context, Feature};
use crate::packages::constraint::parse_version;
use crate::resources::fs::remove_path;
use crate::resources::hardlink::{HardLinkResource, same_file};
use crate::resources::{Resource, ResourceChange};

/// Links the newest installed kernel.
#[derive(Debug, Clone, Copy)]
pub struct Kernel;

impl Kernel {
    /// Feature name.
    pub const NAME: &'static str = "kernel";
}

const IMAGE_PREFIX: &str = "vmlinuz-";

/// Order two kernel versions.
///
/// Like semver, except that pre-release identifiers are also split on `-`,
/// so the ABI number in `6.8.0-100-generic` compares numerically.
fn compare_kernels(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| match (a.pre.is_empty(), b.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_identifiers(a.pre.as_str(), b.pre.as_str()),
        })
}

fn compare_identifiers(a: &str, b: &str) -> Ordering {
    let mut left = a.split(['.', '-']);
    let mut right = b.split(['.', '-']);
    loop {
        let ordering = match (left.next(), right.next()) {
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => x.cmp(y),
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Images under `boot` named `vmlinuz-*`, sorted by path.
///
/// # Errors
///
/// Returns an error if `boot` exists but cannot be read.
pub fn kernel_images(boot: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(boot) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("reading {}", boot.display())),
    };
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("reading {}", boot.display()))?;
        if entry.file_name().to_string_lossy().starts_with(IMAGE_PREFIX) {
            images.push(entry.path());
        }
    }
    images.sort();
    Ok(images)
}

/// Whether `image` is the kernel `link` points at.
///
/// A symlink matches by target file name, a hard link by inode.
#[must_use]
pub fn is_current(image: &Path, link: &Path, link_target: Option<&Path>) -> bool {
    match link_target {
        Some(target) => target.file_name() == image.file_name(),
        None => same_file(image, link).unwrap_or(false),
    }
}

/// Version of the kernel `/boot/vmlinuz` points at, if the link exists and
/// resolves to a `vmlinuz-<version>` image.
///
/// # Errors
///
/// Returns an error if `/boot` cannot be read.
pub fn linked_kernel(ctx: &Context) -> Result<Option<String>> {
    let layout = ctx.layout();
    let link = layout.kernel_link();
    if fs::symlink_metadata(&link).is_err() {
        return Ok(None);
    }
    let link_target = fs::read_link(&link).ok();
    let version = kernel_images(&layout.boot_dir())?
        .into_iter()
        .find(|image| is_current(image, &link, link_target.as_deref()))
        .and_then(|image| {
            image
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.strip_prefix(IMAGE_PREFIX))
                .map(str::to_string)
        });
    Ok(version)
}

/// Name of the newest kernel under `/lib/modules`.
///
/// Entries are compared as kernel versions (see [`compare_kernels`]);
/// directories whose name does not parse are skipped with a warning. The
/// returned string is the directory name as found on disk.
///
/// # Errors
///
/// Returns an error if the modules directory cannot be read or holds no
/// parsable kernel version.
pub fn latest_kernel(ctx: &Context) -> Result<String> {
    let modules = ctx.layout().modules_dir();
    let entries =
        fs::read_dir(&modules).with_context(|| format!("reading {}", modules.display()))?;

    let mut newest: Option<(Version, String)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading {}", modules.display()))?;
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match parse_version(&name) {
            Ok(version) => {
                if newest
                    .as_ref()
                    .is_none_or(|(best, _)| compare_kernels(&version, best) == Ordering::Greater)
                {
                    newest = Some((version, name));
                }
            }
            Err(e) => ctx.log.warn(&format!("skipping kernel {name}: {e}")),
        }
    }

    match newest {
        Some((_, name)) => Ok(name),
        None => bail!("no kernel found under {}", modules.display()),
    }
}

impl Feature for Kernel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn order(&self) -> i32 {
        3
    }

    fn installs_packages(&self) -> bool {
        true
    }

    fn installed(&self, ctx: &Context) -> bool {
        fs::symlink_metadata(ctx.layout().kernel_link()).is_ok()
    }

    fn install(&self, ctx: &Context) -> Result<()> {
        let version = latest_kernel(ctx)?;
        ctx.log.info(&format!("selected kernel {version}"));

        let layout = ctx.layout();
        let link = HardLinkResource::new(layout.kernel_image(&version), layout.kernel_link());
        if link.apply()? == ResourceChange::Applied {
            ctx.log.info(&format!("linked {}", link.description()));
        }
        Ok(())
    }

    fn remove(&self, ctx: &Context) -> Result<()> {
        if !remove_path(&ctx.layout().kernel_link())? {
            ctx.log.debug("kernel link already absent");
        }
        Ok(())
    }

    fn info(&self, ctx: &Context) -> String {
        let layout = ctx.layout();
        format!(
            "Hard-links the newest kernel image in {} to {}.",
            layout.boot_dir().display(),
            layout.kernel_link().display()
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::features::test_helpers::TestHarness;
    use crate::resources::hardlink::same_file;

    fn with_kernels(harness: &TestHarness, versions: &[&str]) {
        for v in versions {
            harness.mkdir(&format!("/lib/modules/{v}"));
            harness.write(&format!("/boot/vmlinuz-{v}"), v);
        }
    }

    #[test]
    fn picks_highest_semantic_version() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["5.15.0", "6.8.0", "6.2.0"]);
        assert_eq!(latest_kernel(&harness.context()).unwrap(), "6.8.0");
    }

    #[test]
    fn compares_numerically_not_lexically() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.9.0", "6.10.0"]);
        assert_eq!(latest_kernel(&harness.context()).unwrap(), "6.10.0");
    }

    #[test]
    fn keeps_directory_name_with_suffix() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.8.0-45-generic", "5.15.0-100-generic"]);
        assert_eq!(
            latest_kernel(&harness.context()).unwrap(),
            "6.8.0-45-generic"
        );
    }

    #[test]
    fn abi_number_compares_numerically() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.8.0-45-generic", "6.8.0-100-generic", "6.8.0-9-generic"]);
        assert_eq!(
            latest_kernel(&harness.context()).unwrap(),
            "6.8.0-100-generic"
        );
    }

    #[test]
    fn release_sorts_above_prerelease() {
        let a = parse_version("6.8.0").unwrap();
        let b = parse_version("6.8.0-100-generic").unwrap();
        assert_eq!(compare_kernels(&a, &b), Ordering::Greater);
        assert_eq!(compare_identifiers("45-generic", "45-lowlatency"), Ordering::Less);
        assert_eq!(compare_identifiers("45", "45-generic"), Ordering::Less);
    }

    #[test]
    fn linked_kernel_follows_hard_link_and_symlink() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.2.0", "6.8.0"]);
        let layout = harness.layout();
        let ctx = harness.context();
        assert_eq!(linked_kernel(&ctx).unwrap(), None);

        fs::hard_link(layout.kernel_image("6.2.0"), layout.kernel_link()).unwrap();
        assert_eq!(linked_kernel(&ctx).unwrap().as_deref(), Some("6.2.0"));

        fs::remove_file(layout.kernel_link()).unwrap();
        std::os::unix::fs::symlink("vmlinuz-6.8.0", layout.kernel_link()).unwrap();
        assert_eq!(linked_kernel(&ctx).unwrap().as_deref(), Some("6.8.0"));
    }

    #[test]
    fn skips_unparsable_directories() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.2.0"]);
        harness.mkdir("/lib/modules/extramodules");
        harness.write("/lib/modules/7.0.0", "not a directory");
        assert_eq!(latest_kernel(&harness.context()).unwrap(), "6.2.0");
    }

    #[test]
    fn no_kernels_is_an_error() {
        let harness = TestHarness::new();
        harness.mkdir("/lib/modules/extramodules");
        let err = latest_kernel(&harness.context()).unwrap_err();
        assert!(err.to_string().contains("no kernel found"));
    }

    #[test]
    fn install_links_newest_image() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["5.15.0", "6.8.0", "6.2.0"]);
        let ctx = harness.context();
        assert!(!Kernel.installed(&ctx));

        Kernel.install(&ctx).unwrap();

        assert!(Kernel.installed(&ctx));
        let layout = harness.layout();
        assert!(same_file(&layout.kernel_image("6.8.0"), &layout.kernel_link()).unwrap());
    }

    #[test]
    fn install_fails_without_image() {
        let harness = TestHarness::new();
        harness.mkdir("/lib/modules/6.8.0");
        assert!(Kernel.install(&harness.context()).is_err());
    }

    #[test]
    fn remove_deletes_link_only() {
        let harness = TestHarness::new();
        with_kernels(&harness, &["6.8.0"]);
        let ctx = harness.context();
        Kernel.install(&ctx).unwrap();

        Kernel.remove(&ctx).unwrap();

        assert!(!Kernel.installed(&ctx));
        assert!(harness.layout().kernel_image("6.8.0").exists());
    }
}
