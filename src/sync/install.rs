//! Applies an [`InstallPlan`]: merge copies, executable-bit fixups and asset
//! directory seeding.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::fs::merge_copy;
use super::plan::InstallPlan;
use crate::config::ConfigName;
use crate::error::SetupError;
use crate::logging::Log;

/// Path segment whose contents are always made executable.
const SCRIPTS_SEGMENT: &str = "scripts";

/// Shell script extension.
const SHELL_EXTENSION: &str = "sh";

/// What happened to one planned copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The entry was merged; `files` regular files were written.
    Copied {
        /// Regular files written.
        files: usize,
    },
    /// Nothing to copy.
    Skipped {
        /// Why nothing was copied.
        reason: String,
    },
    /// The copy failed part-way.
    Failed {
        /// The error that stopped the copy.
        error: String,
    },
}

/// Outcome of one named configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Configuration unit name.
    pub name: ConfigName,
    /// Where it was merged to.
    pub dest: PathBuf,
    /// What happened.
    pub outcome: EntryOutcome,
}

/// Result of applying an [`InstallPlan`].
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Per-entry outcomes, in plan order.
    pub entries: Vec<EntryReport>,
    /// Outcomes of repository asset merges, keyed by destination.
    pub assets: Vec<(PathBuf, EntryOutcome)>,
    /// Files whose executable bits were set.
    pub made_executable: Vec<PathBuf>,
    /// Asset directories ensured to exist.
    pub seeded: Vec<PathBuf>,
}

impl InstallReport {
    /// Number of entries that were copied.
    #[must_use]
    pub fn copied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Copied { .. }))
            .count()
    }

    /// Number of entries that were skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, EntryOutcome::Skipped { .. }))
            .count()
    }

    /// Entries (and asset merges) that failed, as display lines.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        let entries = self.entries.iter().filter_map(|e| match &e.outcome {
            EntryOutcome::Failed { error } => Some(format!("{}: {error}", e.name)),
            _ => None,
        });
        let assets = self.assets.iter().filter_map(|(dest, outcome)| match outcome {
            EntryOutcome::Failed { error } => Some(format!("{}: {error}", dest.display())),
            _ => None,
        });
        entries.chain(assets).collect()
    }

    /// Outcome recorded for `name`, if it was planned.
    #[must_use]
    pub fn outcome_of(&self, name: &str) -> Option<&EntryOutcome> {
        self.entries
            .iter()
            .find(|e| e.name.as_str() == name)
            .map(|e| &e.outcome)
    }
}

/// Applies [`InstallPlan`]s to the filesystem.
#[derive(Debug, Clone)]
pub struct ConfigInstaller {
    log: Arc<dyn Log>,
}

impl ConfigInstaller {
    /// Create an installer that reports through `log`.
    #[must_use]
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self { log }
    }

    /// Apply `plan`.
    ///
    /// Per-entry copy problems are recorded in the report rather than
    /// returned; a missing source is a skip.
    ///
    /// # Errors
    ///
    /// Returns an error if file modes cannot be updated or an asset
    /// directory cannot be created.
    pub fn install(&self, plan: InstallPlan) -> Result<InstallReport> {
        let mut report = InstallReport::default();
        let mut copied: Vec<(PathBuf, PathBuf)> = Vec::new();

        for entry in plan.entries {
            let (outcome, files) = self.copy_one(&entry.source, &entry.dest);
            copied.extend(files.into_iter().map(|f| (plan.dest_root.clone(), f)));
            self.log_outcome(entry.name.as_str(), &outcome);
            report.entries.push(EntryReport {
                name: entry.name,
                dest: entry.dest,
                outcome,
            });
        }

        for merge in plan.asset_merges {
            let (outcome, files) = self.copy_one(&merge.source, &merge.dest);
            copied.extend(files.into_iter().map(|f| (merge.dest.clone(), f)));
            self.log_outcome(&merge.dest.display().to_string(), &outcome);
            report.assets.push((merge.dest, outcome));
        }

        for (root, file) in copied {
            if needs_exec(&root, &file) {
                make_executable(&file)?;
                self.log
                    .debug(&format!("marked executable: {}", file.display()));
                report.made_executable.push(file);
            }
        }

        for dir in plan.seed_dirs {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            report.seeded.push(dir);
        }

        Ok(report)
    }

    fn copy_one(&self, source: &Path, dest: &Path) -> (EntryOutcome, Vec<PathBuf>) {
        if source.symlink_metadata().is_err() {
            let missing = SetupError::MissingSource(source.to_path_buf());
            return (
                EntryOutcome::Skipped {
                    reason: missing.to_string(),
                },
                Vec::new(),
            );
        }
        self.log.debug(&format!(
            "merging {} -> {}",
            source.display(),
            dest.display()
        ));
        match merge_copy(source, dest) {
            Ok(files) => (EntryOutcome::Copied { files: files.len() }, files),
            Err(e) => (
                EntryOutcome::Failed {
                    error: format!("{e:#}"),
                },
                Vec::new(),
            ),
        }
    }

    fn log_outcome(&self, label: &str, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Copied { files } => {
                self.log.info(&format!("installed {label} ({files} files)"));
            }
            EntryOutcome::Skipped { reason } => {
                self.log.debug(&format!("skipped {label}: {reason}"));
            }
            EntryOutcome::Failed { error } => {
                self.log.error(&format!("failed to install {label}: {error}"));
            }
        }
    }
}

/// A copied file needs `+x` if it is a shell script or lives below a
/// `scripts` directory relative to `root`.
fn needs_exec(root: &Path, file: &Path) -> bool {
    let is_shell = file
        .extension()
        .is_some_and(|ext| ext == SHELL_EXTENSION);
    let rel = file.strip_prefix(root).unwrap_or(file);
    let under_scripts = rel
        .parent()
        .is_some_and(|dir| dir.components().any(|c| c.as_os_str() == SCRIPTS_SEGMENT));
    is_shell || under_scripts
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("reading mode of {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("setting mode of {}", path.display()))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::sync::plan::{AssetMerge, CopyEntry};
    use crate::sync::SourceLayout;

    fn installer() -> ConfigInstaller {
        ConfigInstaller::new(Arc::new(Logger::new()))
    }

    fn entry(name: &str, source: &Path, dest_root: &Path) -> CopyEntry {
        CopyEntry {
            name: ConfigName::new(name).unwrap(),
            source: source.join(name),
            dest: dest_root.join(name),
        }
    }

    fn plan(dest_root: &Path, entries: Vec<CopyEntry>) -> InstallPlan {
        InstallPlan {
            layout: SourceLayout::NestedConfigDir,
            dest_root: dest_root.to_path_buf(),
            entries,
            asset_merges: Vec::new(),
            seed_dirs: Vec::new(),
            script: None,
        }
    }

    #[test]
    fn needs_exec_rules() {
        let root = Path::new("/home/u/.config");
        assert!(needs_exec(root, Path::new("/home/u/.config/hypr/start.sh")));
        assert!(needs_exec(
            root,
            Path::new("/home/u/.config/hypr/scripts/volume")
        ));
        assert!(needs_exec(
            root,
            Path::new("/home/u/.config/hypr/scripts/lib/helper.py")
        ));
        assert!(!needs_exec(root, Path::new("/home/u/.config/hypr/hyprland.conf")));
        assert!(!needs_exec(root, Path::new("/home/u/.config/scripts")));
        assert!(!needs_exec(root, Path::new("/home/u/.config/waybar/config.shx")));
        assert!(
            !needs_exec(Path::new("/home/scripts"), Path::new("/home/scripts/a.conf")),
            "segments above the root do not count"
        );
    }

    #[test]
    fn missing_source_is_skipped() {
        let repo = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let report = installer()
            .install(plan(dest.path(), vec![entry("rofi", repo.path(), dest.path())]))
            .unwrap();
        assert!(matches!(
            report.outcome_of("rofi"),
            Some(EntryOutcome::Skipped { .. })
        ));
        assert_eq!(report.skipped_count(), 1);
        assert!(report.failures().is_empty());
    }

    #[test]
    fn copied_entries_report_file_counts() {
        let repo = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(repo.path().join("hypr")).unwrap();
        std::fs::write(repo.path().join("hypr/hyprland.conf"), "a").unwrap();
        std::fs::write(repo.path().join("hypr/keys.conf"), "b").unwrap();

        let report = installer()
            .install(plan(dest.path(), vec![entry("hypr", repo.path(), dest.path())]))
            .unwrap();
        assert_eq!(
            report.outcome_of("hypr"),
            Some(&EntryOutcome::Copied { files: 2 })
        );
        assert_eq!(report.copied_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn failed_copy_is_reported_not_returned() {
        let repo = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(repo.path().join("kitty/themes")).unwrap();
        std::fs::write(repo.path().join("kitty/themes/dark.conf"), "x").unwrap();
        // A regular file where a directory must go and which cannot be
        // removed because its parent is read-only.
        std::fs::create_dir_all(dest.path().join("kitty")).unwrap();
        std::fs::write(dest.path().join("kitty/themes"), "blocking file").unwrap();
        let ro = {
            use std::os::unix::fs::PermissionsExt;
            std::fs::Permissions::from_mode(0o555)
        };
        std::fs::set_permissions(dest.path().join("kitty"), ro).unwrap();

        let result = installer()
            .install(plan(dest.path(), vec![entry("kitty", repo.path(), dest.path())]));

        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                dest.path().join("kitty"),
                std::fs::Permissions::from_mode(0o755),
            )
            .unwrap();
        }

        let report = result.unwrap();
        // Running as root ignores the read-only bit, in which case the copy succeeds.
        if let Some(EntryOutcome::Failed { error }) = report.outcome_of("kitty") {
            assert!(!error.is_empty());
            assert_eq!(report.failures().len(), 1);
        }
    }

    #[cfg(unix)]
    #[test]
    fn scripts_and_shell_files_become_executable() {
        use std::os::unix::fs::PermissionsExt;
        let repo = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(repo.path().join("hypr/scripts")).unwrap();
        std::fs::write(repo.path().join("hypr/scripts/volume"), "#!/bin/sh").unwrap();
        std::fs::write(repo.path().join("hypr/autostart.sh"), "#!/bin/sh").unwrap();
        std::fs::write(repo.path().join("hypr/hyprland.conf"), "x").unwrap();
        for f in ["hypr/scripts/volume", "hypr/autostart.sh", "hypr/hyprland.conf"] {
            std::fs::set_permissions(
                repo.path().join(f),
                std::fs::Permissions::from_mode(0o644),
            )
            .unwrap();
        }

        let report = installer()
            .install(plan(dest.path(), vec![entry("hypr", repo.path(), dest.path())]))
            .unwrap();

        let mode = |f: &str| {
            std::fs::metadata(dest.path().join(f))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode("hypr/scripts/volume"), 0o755);
        assert_eq!(mode("hypr/autostart.sh"), 0o755);
        assert_eq!(mode("hypr/hyprland.conf"), 0o644);
        assert_eq!(report.made_executable.len(), 2);
    }

    #[test]
    fn seeds_directories_and_merges_assets() {
        let repo = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(repo.path().join("wallpapers")).unwrap();
        std::fs::write(repo.path().join("wallpapers/forest.png"), "png").unwrap();

        let walls = home.path().join("Pictures/Wallpapers");
        let mut p = plan(&home.path().join(".config"), Vec::new());
        p.asset_merges.push(AssetMerge {
            source: repo.path().join("wallpapers"),
            dest: walls.clone(),
        });
        p.seed_dirs = vec![
            walls.clone(),
            home.path().join("Pictures/Screenshots"),
            home.path().join(".local/bin"),
        ];

        let report = installer().install(p).unwrap();
        assert!(walls.join("forest.png").is_file());
        assert!(home.path().join("Pictures/Screenshots").is_dir());
        assert!(home.path().join(".local/bin").is_dir());
        assert_eq!(report.seeded.len(), 3);
        assert_eq!(report.assets[0].1, EntryOutcome::Copied { files: 1 });
    }
}
