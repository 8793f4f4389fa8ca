//! Filesystem query abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that layout detection can be
//! unit-tested without touching the real filesystem.  Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Abstraction over the read-only filesystem queries used to inspect a
/// cloned repository.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory (following symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a regular file (following symlinks).
    fn is_file(&self, path: &Path) -> bool;

    /// Returns the immediate child paths inside `path`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| e.map(|entry| entry.path()).map_err(Into::into))
            .collect::<Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure regular files and directories with the builder-style
/// methods.  Registering a path also lists it as a child of its parent and
/// marks every ancestor as a directory, so a tree can be described by its
/// leaves alone.
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_file("/repo/.config/hypr/hyprland.conf")
///     .with_dir("/repo/.git");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::collections::BTreeSet<PathBuf>,
    dirs: std::collections::BTreeMap<PathBuf, std::collections::BTreeSet<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as a regular file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.link_ancestors(&p);
        self.files.insert(p);
        self
    }

    /// Register `path` as a (possibly empty) directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.link_ancestors(&p);
        self.dirs.entry(p).or_default();
        self
    }

    fn link_ancestors(&mut self, path: &Path) {
        let mut child = path.to_path_buf();
        while let Some(parent) = child.parent() {
            if parent.as_os_str().is_empty() {
                break;
            }
            self.dirs
                .entry(parent.to_path_buf())
                .or_default()
                .insert(child.clone());
            child = parent.to_path_buf();
        }
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.dirs
            .get(path)
            .map(|children| children.iter().cloned().collect())
            .ok_or_else(|| anyhow::anyhow!("not a directory: {}", path.display()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_read_dir_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["waybar", "hypr", "kitty"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let entries = SystemFileSystemOps.read_dir(dir.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["hypr", "kitty", "waybar"]);
    }

    #[test]
    fn system_read_dir_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SystemFileSystemOps.read_dir(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn system_file_and_dir_checks() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("install.sh");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        assert!(SystemFileSystemOps.is_file(&file));
        assert!(!SystemFileSystemOps.is_dir(&file));
        assert!(SystemFileSystemOps.is_dir(dir.path()));
        assert!(SystemFileSystemOps.exists(&file));
    }

    #[test]
    fn mock_registers_ancestors() {
        let fs = MockFileSystemOps::new().with_file("/repo/.config/hypr/hyprland.conf");
        assert!(fs.is_dir(Path::new("/repo/.config/hypr")));
        assert!(fs.is_dir(Path::new("/repo/.config")));
        assert!(fs.is_file(Path::new("/repo/.config/hypr/hyprland.conf")));
        assert_eq!(
            fs.read_dir(Path::new("/repo")).unwrap(),
            vec![PathBuf::from("/repo/.config")]
        );
    }

    #[test]
    fn mock_read_dir_sorted_and_missing() {
        let fs = MockFileSystemOps::new()
            .with_dir("/repo/waybar")
            .with_dir("/repo/hypr");
        assert_eq!(
            fs.read_dir(Path::new("/repo")).unwrap(),
            vec![PathBuf::from("/repo/hypr"), PathBuf::from("/repo/waybar")]
        );
        assert!(fs.read_dir(Path::new("/elsewhere")).is_err());
    }
}
