//! Base tools and the AUR helper.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Context, Step, StepResult, done, pacman_install};
use crate::config::AurHelper;

/// Install base tooling and bootstrap the AUR helper.
#[derive(Debug)]
pub struct InstallTools;

impl Step for InstallTools {
    fn name(&self) -> &'static str {
        "Install tools"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        pacman_install(ctx, &ctx.manifest.packages.tools).context("installing base tools")?;

        let helper = ctx.manifest.packages.aur_helper;
        if ctx.manifest.packages.aur.is_empty() {
            ctx.log
                .debug(&format!("no AUR packages, {helper} not needed"));
        } else if ctx.runner.which(helper.program()) {
            ctx.log.info(&format!("{helper} already installed"));
        } else {
            bootstrap_helper(ctx, helper)?;
        }

        Ok(done(ctx))
    }
}

/// Build directory for the helper package.
fn build_dir(helper: AurHelper) -> PathBuf {
    std::env::temp_dir().join(format!("hyprsetup-{helper}-bin"))
}

/// Clone `<helper>-bin` from the AUR and build it with makepkg.
fn bootstrap_helper(ctx: &Context, helper: AurHelper) -> Result<()> {
    ctx.log
        .info(&format!("installing {helper} from the AUR"));
    let dir = build_dir(helper);
    if !ctx.dry_run && dir.exists() {
        ctx.log.debug("removing previous build directory");
        std::fs::remove_dir_all(&dir)
            .with_context(|| format!("removing {}", dir.display()))?;
    }

    let url = helper.bootstrap_url();
    let dir_arg = dir.to_string_lossy();
    ctx.runner
        .run("git", &["clone", &url, &dir_arg], false)
        .with_context(|| format!("cloning {helper}-bin from the AUR"))?;
    ctx.runner
        .run_interactive(Some(dir.as_path()), "makepkg", &["-si", "--noconfirm"], false)
        .with_context(|| format!("building {helper}-bin"))?;

    if !ctx.dry_run {
        cleanup(&dir);
    }
    Ok(())
}

/// Remove the build directory (best effort, ignores errors).
fn cleanup(dir: &Path) {
    std::fs::remove_dir_all(dir).ok();
}
