//! Snapshot of the existing configuration.
use anyhow::Result;
use std::sync::Arc;

use super::{Context, Step, StepResult};
use crate::sync::{BackupManager, backup::BACKUP_PREFIX};

/// Snapshot the configurations the flavor is about to replace.
#[derive(Debug)]
pub struct BackupConfigs;

impl Step for BackupConfigs {
    fn name(&self) -> &'static str {
        "Back up configs"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let root = &ctx.targets.config_root;
        let names = &ctx.manifest.backup.configs;

        if ctx.dry_run {
            let parent = root.parent().unwrap_or(root);
            ctx.log.dry_run(&format!(
                "back up {} configs from {} into {}",
                names.len(),
                root.display(),
                parent.join(format!("{BACKUP_PREFIX}<timestamp>")).display()
            ));
            return Ok(StepResult::DryRun);
        }

        let snapshot = BackupManager::new(Arc::clone(&ctx.log)).snapshot(root, names)?;
        ctx.log.info(&format!(
            "saved {} of {} configs in {}",
            snapshot.saved.len(),
            names.len(),
            snapshot.backup_dir.display()
        ));
        ctx.set_snapshot(snapshot);
        Ok(StepResult::Ok)
    }
}
