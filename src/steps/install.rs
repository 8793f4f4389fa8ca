//! Installing the repository's configuration.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use super::{Context, Step, StepResult};
use crate::error::SetupError;
use crate::sync::{ConfigInstaller, InstallPlan, LayoutResolver};

/// Resolve the repository layout and install its configuration.
#[derive(Debug)]
pub struct InstallConfigs;

impl Step for InstallConfigs {
    fn name(&self) -> &'static str {
        "Install configs"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let repo = ctx.repo_dir();
        if ctx.dry_run && !repo.is_dir() {
            ctx.log.dry_run(&format!(
                "install configuration from {} into {}",
                repo.display(),
                ctx.targets.config_root.display()
            ));
            return Ok(StepResult::DryRun);
        }

        let resolver = LayoutResolver::new(Arc::clone(&ctx.fs_ops));
        let layout = resolver.resolve(&repo)?;
        ctx.log.info(&format!("repository layout: {layout}"));
        let plan = InstallPlan::build(&resolver, &layout, &repo, &ctx.targets, &ctx.manifest)
            .context("planning installation")?;
        ctx.log.debug(&format!(
            "plan: {} entries, {} asset merges",
            plan.entries.len(),
            plan.asset_merges.len()
        ));

        if let Some(script) = &plan.script {
            let script_name = script
                .file_name()
                .unwrap_or(script.as_os_str())
                .to_string_lossy()
                .into_owned();
            let question = format!("The repository provides {script_name}. Run it?");
            if !ctx.prompt.confirm(&question) {
                return Err(SetupError::UserDeclined(format!(
                    "{script_name} was not approved"
                ))
                .into());
            }
            ctx.runner
                .run_interactive(Some(repo.as_path()), "bash", &[script_name.as_str()], false)
                .with_context(|| format!("running {script_name}"))?;
        }

        if ctx.dry_run {
            for entry in &plan.entries {
                ctx.log.dry_run(&format!(
                    "merge {} -> {}",
                    entry.source.display(),
                    entry.dest.display()
                ));
            }
            for merge in &plan.asset_merges {
                ctx.log.dry_run(&format!(
                    "merge {} -> {}",
                    merge.source.display(),
                    merge.dest.display()
                ));
            }
            for dir in &plan.seed_dirs {
                ctx.log.dry_run(&format!("create {}", dir.display()));
            }
            return Ok(StepResult::DryRun);
        }

        if ctx.snapshot.is_none() {
            anyhow::bail!("refusing to modify configuration without a backup snapshot");
        }

        let report = ConfigInstaller::new(Arc::clone(&ctx.log)).install(plan)?;
        ctx.log.info(&format!(
            "{} installed, {} skipped, {} made executable",
            report.copied_count(),
            report.skipped_count(),
            report.made_executable.len()
        ));
        let failures = report.failures();
        ctx.report = Some(report);

        if !failures.is_empty() {
            anyhow::bail!(
                "{} configuration entries failed: {}",
                failures.len(),
                failures.join("; ")
            );
        }
        Ok(StepResult::Ok)
    }
}
