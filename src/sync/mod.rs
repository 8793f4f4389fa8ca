//! The configuration sync procedure: back up what exists, work out the shape
//! of the cloned repository, then merge its contents into place.
pub mod backup;
pub mod fs;
pub mod install;
pub mod layout;
pub mod plan;

use std::path::{Path, PathBuf};

pub use backup::{BackupManager, BackupSnapshot};
pub use install::{ConfigInstaller, EntryOutcome, InstallReport};
pub use layout::{LayoutResolver, SourceLayout};
pub use plan::InstallPlan;

/// Destination roots for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTargets {
    /// The user's home directory; asset paths are relative to it.
    pub home: PathBuf,
    /// Configuration root, `<home>/.config`.
    pub config_root: PathBuf,
}

impl InstallTargets {
    /// Targets for `home`, with the configuration root at `home/.config`.
    #[must_use]
    pub fn for_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            config_root: home.join(".config"),
        }
    }
}
