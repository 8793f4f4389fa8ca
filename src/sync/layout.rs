//! Classification of a cloned configuration repository.
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::ConfigName;
use crate::error::SetupError;
use crate::operations::FileSystemOps;

/// Scripts that mark a repository as installing itself.
pub const INSTALLER_SCRIPTS: &[&str] = &["install.sh", "setup.sh"];

/// Version-control metadata never treated as configuration.
pub const VCS_DIRS: &[&str] = &[".git", ".github"];

/// Shape of a configuration repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLayout {
    /// Configurations live under `.config/`.
    NestedConfigDir,
    /// Configurations live under `config/`.
    FlatConfigDir,
    /// The repository ships its own installer script.
    SelfInstalling {
        /// Path of the installer script.
        script: PathBuf,
    },
    /// Every top-level entry is a configuration.
    FlatTopLevel,
}

impl SourceLayout {
    /// Directory whose children are configuration units, if any.
    #[must_use]
    pub fn source_dir(&self, repo_root: &Path) -> Option<PathBuf> {
        match self {
            Self::NestedConfigDir => Some(repo_root.join(".config")),
            Self::FlatConfigDir => Some(repo_root.join("config")),
            Self::SelfInstalling { .. } => None,
            Self::FlatTopLevel => Some(repo_root.to_path_buf()),
        }
    }
}

impl std::fmt::Display for SourceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NestedConfigDir => f.write_str("nested .config directory"),
            Self::FlatConfigDir => f.write_str("config directory"),
            Self::SelfInstalling { script } => {
                write!(f, "self-installing ({})", script.display())
            }
            Self::FlatTopLevel => f.write_str("flat top-level"),
        }
    }
}

/// Detects the [`SourceLayout`] of a repository and lists its configuration
/// units.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    fs: Arc<dyn FileSystemOps>,
}

impl LayoutResolver {
    /// Create a resolver that inspects the repository through `fs`.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystemOps>) -> Self {
        Self { fs }
    }

    /// Classify `repo_root`; the first matching rule wins:
    /// `.config/`, then `config/`, then an installer script, then flat.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingSource`] if `repo_root` is not a directory.
    pub fn resolve(&self, repo_root: &Path) -> Result<SourceLayout> {
        if !self.fs.is_dir(repo_root) {
            return Err(SetupError::MissingSource(repo_root.to_path_buf()).into());
        }
        if self.fs.is_dir(&repo_root.join(".config")) {
            return Ok(SourceLayout::NestedConfigDir);
        }
        if self.fs.is_dir(&repo_root.join("config")) {
            return Ok(SourceLayout::FlatConfigDir);
        }
        if let Some(script) = INSTALLER_SCRIPTS
            .iter()
            .map(|name| repo_root.join(name))
            .find(|path| self.fs.is_file(path))
        {
            return Ok(SourceLayout::SelfInstalling { script });
        }
        Ok(SourceLayout::FlatTopLevel)
    }

    /// Sorted configuration units found in the layout's source directory.
    ///
    /// For [`SourceLayout::FlatTopLevel`] version-control metadata is
    /// excluded.  Entries whose names are not valid [`ConfigName`]s are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory cannot be listed.
    pub fn discover(
        &self,
        layout: &SourceLayout,
        repo_root: &Path,
    ) -> Result<Vec<(ConfigName, PathBuf)>> {
        let Some(dir) = layout.source_dir(repo_root) else {
            return Ok(Vec::new());
        };
        let exclude: &[&str] = if *layout == SourceLayout::FlatTopLevel {
            VCS_DIRS
        } else {
            &[]
        };

        let mut found: Vec<(ConfigName, PathBuf)> = self
            .fs
            .read_dir(&dir)?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                if exclude.contains(&name) {
                    return None;
                }
                let name = ConfigName::new(name).ok()?;
                Some((name, path))
            })
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    /// Whether `path` is a directory in the resolver's view of the filesystem.
    #[must_use]
    pub fn is_dir(&self, path: &Path) -> bool {
        self.fs.is_dir(path)
    }
}
