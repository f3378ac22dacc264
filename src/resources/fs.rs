//! File-system helpers shared by features.
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context as _, Result};
use walkdir::WalkDir;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove a file, symlink or directory tree at `path`.
///
/// Returns `false` if nothing was there.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("stat {}", path.display())),
    };
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.with_context(|| format!("remove {}", path.display()))?;
    Ok(true)
}

/// Copy the contents of `src` over `dst`, merging into existing directories
/// and replacing existing files.
///
/// Symlinks are recreated rather than followed. Returns the number of files
/// and links written.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or an entry cannot be copied.
pub fn overlay_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut written = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("entry outside {}", src.display()))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("creating directory {}", target.display()))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())
                .with_context(|| format!("reading link {}", entry.path().display()))?;
            ensure_parent_dir(&target)?;
            remove_path(&target)?;
            std::os::unix::fs::symlink(&link, &target)
                .with_context(|| format!("linking {}", target.display()))?;
            written += 1;
        } else {
            ensure_parent_dir(&target)?;
            if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
                remove_path(&target)?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copying {} to {}", entry.path().display(), target.display())
            })?;
            written += 1;
        }
    }
    Ok(written)
}

/// Unpack the tar archive at `archive` onto `dst`.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or unpacked.
pub fn extract_tar(archive: &Path, dst: &Path) -> Result<()> {
    let file =
        fs::File::open(archive).with_context(|| format!("opening {}", archive.display()))?;
    let mut tar = tar::Archive::new(io::BufReader::new(file));
    tar.set_preserve_permissions(true);
    tar.set_overwrite(true);
    tar.unpack(dst).with_context(|| {
        format!("unpacking {} into {}", archive.display(), dst.display())
    })
}
