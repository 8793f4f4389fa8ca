//! Shared state threaded through the steps.
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::Manifest;
use crate::exec::CommandRunner;
use crate::fetch::Downloader;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::platform::Platform;
use crate::prompt::PromptGate;
use crate::sync::{BackupSnapshot, InstallReport, InstallTargets};

/// Backup location shared with the interrupt handler.
pub type BackupMarker = Arc<Mutex<Option<PathBuf>>>;

/// Shared state for one provisioning run.
///
/// Steps read their inputs from here and record what later steps need
/// (the snapshot and the install report).
pub struct Context {
    /// Flavor manifest driving the run.
    pub manifest: Manifest,
    /// Detected platform information.
    pub platform: Platform,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Runs external commands (honours dry-run).
    pub runner: CommandRunner,
    /// Asks for consent.
    pub prompt: Arc<PromptGate>,
    /// Filesystem queries for layout detection.
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// HTTP downloads.
    pub downloader: Arc<dyn Downloader>,
    /// Home and configuration roots.
    pub targets: InstallTargets,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Snapshot taken by the backup step.
    pub snapshot: Option<BackupSnapshot>,
    /// Report produced by the install step.
    pub report: Option<InstallReport>,
    /// Mirror of the snapshot location for the interrupt handler.
    pub backup_marker: BackupMarker,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("flavor", &self.manifest.flavor.name)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("targets", &self.targets)
            .field("snapshot", &self.snapshot.as_ref().map(|s| &s.backup_dir))
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Where the configuration repository is cloned.
    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        self.targets.home.join(&self.manifest.source.clone_dir)
    }

    /// Record the snapshot and publish its location to the interrupt handler.
    pub fn set_snapshot(&mut self, snapshot: BackupSnapshot) {
        if let Ok(mut marker) = self.backup_marker.lock() {
            *marker = Some(snapshot.backup_dir.clone());
        }
        self.snapshot = Some(snapshot);
    }
}
