//! Timestamped snapshots of configuration directories.
//!
//! A snapshot lives next to the configuration root (for `~/.config` it is
//! `~/config-backup-YYYYMMDD-HHMMSS`) and is never overwritten: a second
//! snapshot within the same second gets a numeric suffix.
use anyhow::{Context as _, Result};
use chrono::{Local, NaiveDateTime};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::fs::merge_copy;
use crate::config::ConfigName;
use crate::error::SetupError;
use crate::logging::Log;

/// Prefix of every backup directory name.
pub const BACKUP_PREFIX: &str = "config-backup-";

/// Highest numeric suffix tried before giving up on a unique name.
const MAX_SUFFIX: u32 = 999;

/// An immutable record of one backup run.
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
    /// When the snapshot was taken (local time).
    pub timestamp: NaiveDateTime,
    /// The configuration root that was backed up.
    pub source_root: PathBuf,
    /// Directory holding the saved copies.
    pub backup_dir: PathBuf,
    /// Saved location of every configuration that existed.
    pub saved: BTreeMap<ConfigName, PathBuf>,
}

impl BackupSnapshot {
    /// Whether nothing was saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}

/// Creates [`BackupSnapshot`]s.
#[derive(Debug, Clone)]
pub struct BackupManager {
    log: Arc<dyn Log>,
}

impl BackupManager {
    /// Create a manager that reports through `log`.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self { log }
    }

    /// Snapshot every existing `names` directory under `config_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Backup`] if the backup directory cannot be
    /// created, or an error if a configuration cannot be copied.
    pub fn snapshot<'a>(
        &self,
        config_root: &Path,
        names: impl IntoIterator<Item = &'a ConfigName>,
    ) -> Result<BackupSnapshot> {
        self.snapshot_at(config_root, names, Local::now().naive_local())
    }

    /// Like [`Self::snapshot`] with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// See [`Self::snapshot`].
    pub fn snapshot_at<'a>(
        &self,
        config_root: &Path,
        names: impl IntoIterator<Item = &'a ConfigName>,
        timestamp: NaiveDateTime,
    ) -> Result<BackupSnapshot> {
        let parent = config_root.parent().ok_or_else(|| SetupError::Backup {
            path: config_root.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::InvalidInput,
                "configuration root has no parent directory",
            ),
        })?;
        let backup_dir = create_unique_dir(parent, &backup_dir_name(timestamp))?;
        self.log
            .debug(&format!("backup directory: {}", backup_dir.display()));

        let mut saved = BTreeMap::new();
        for name in names {
            if saved.contains_key(name) {
                continue;
            }
            let source = config_root.join(name);
            if source.symlink_metadata().is_err() {
                self.log
                    .debug(&format!("no existing {name} config, nothing to back up"));
                continue;
            }
            let target = backup_dir.join(name);
            merge_copy(&source, &target)
                .with_context(|| format!("backing up {}", source.display()))?;
            self.log
                .info(&format!("backed up {name} -> {}", target.display()));
            saved.insert(name.clone(), target);
        }

        Ok(BackupSnapshot {
            timestamp,
            source_root: config_root.to_path_buf(),
            backup_dir,
            saved,
        })
    }
}

/// `config-backup-YYYYMMDD-HHMMSS`
fn backup_dir_name(timestamp: NaiveDateTime) -> String {
    format!("{BACKUP_PREFIX}{}", timestamp.format("%Y%m%d-%H%M%S"))
}

/// Exclusively create `parent/base`, or `parent/base-N` for the first free `N`.
fn create_unique_dir(parent: &Path, base: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(parent).map_err(|source| SetupError::Backup {
        path: parent.to_path_buf(),
        source,
    })?;

    let mut last = parent.join(base);
    for suffix in 0..=MAX_SUFFIX {
        let candidate = if suffix == 0 {
            parent.join(base)
        } else {
            parent.join(format!("{base}-{suffix}"))
        };
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => last = candidate,
            Err(source) => {
                return Err(SetupError::Backup {
                    path: candidate,
                    source,
                }
                .into());
            }
        }
    }
    Err(SetupError::Backup {
        path: last,
        source: std::io::Error::new(ErrorKind::AlreadyExists, "no free backup directory name"),
    }
    .into())
}
