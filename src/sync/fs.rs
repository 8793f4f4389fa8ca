//! Tree copy helpers shared by the backup and install paths.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove a file or symlink at `path` so a different kind of entry can take
/// its place.  Directories are left alone.  Does nothing if `path` does not
/// exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
fn remove_non_dir(path: &Path) -> Result<()> {
    if let Ok(meta) = path.symlink_metadata()
        && !meta.is_dir()
    {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Recursively merge `src` into `dst`.
///
/// Files with the same relative path are overwritten; files that exist only
/// under `dst` are kept.  `src` may itself be a single file.  Symlinks are
/// recreated as symlinks on Unix rather than followed.
///
/// Returns the destination paths of every regular file written.
///
/// # Errors
///
/// Returns an error if `src` cannot be read or any entry cannot be written.
pub fn merge_copy(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    ensure_parent_dir(dst)?;
    copy_entry(src, dst, &mut copied)?;
    Ok(copied)
}

fn copy_entry(src: &Path, dst: &Path, copied: &mut Vec<PathBuf>) -> Result<()> {
    let meta = std::fs::symlink_metadata(src)
        .with_context(|| format!("reading metadata of {}", src.display()))?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        copy_symlink(src, dst, copied)
    } else if file_type.is_dir() {
        remove_non_dir(dst)?;
        std::fs::create_dir_all(dst)
            .with_context(|| format!("creating directory {}", dst.display()))?;
        let mut children = std::fs::read_dir(src)
            .with_context(|| format!("reading directory {}", src.display()))?
            .map(|e| e.map(|entry| entry.file_name()))
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading entry in {}", src.display()))?;
        children.sort();
        for name in children {
            copy_entry(&src.join(&name), &dst.join(&name), copied)?;
        }
        Ok(())
    } else {
        // A symlink at the destination would redirect the write elsewhere.
        if dst.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
            remove_non_dir(dst)?;
        }
        std::fs::copy(src, dst).with_context(|| {
            format!("copying {} to {}", src.display(), dst.display())
        })?;
        copied.push(dst.to_path_buf());
        Ok(())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path, _copied: &mut Vec<PathBuf>) -> Result<()> {
    let target = std::fs::read_link(src)
        .with_context(|| format!("reading symlink {}", src.display()))?;
    remove_non_dir(dst)?;
    std::os::unix::fs::symlink(&target, dst).with_context(|| {
        format!("creating symlink {} -> {}", dst.display(), target.display())
    })
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path, copied: &mut Vec<PathBuf>) -> Result<()> {
    if src.is_dir() {
        std::fs::create_dir_all(dst)
            .with_context(|| format!("creating directory {}", dst.display()))?;
        for entry in std::fs::read_dir(src)? {
            let entry = entry?;
            copy_entry(&entry.path(), &dst.join(entry.file_name()), copied)?;
        }
    } else {
        std::fs::copy(src, dst)
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
        copied.push(dst.to_path_buf());
    }
    Ok(())
}

/// Returns `true` if `dir` contains at least one regular file at any depth.
#[must_use]
pub fn contains_files(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        let path = entry.path();
        if path.is_dir() {
            contains_files(&path)
        } else {
            path.is_file()
        }
    })
}
