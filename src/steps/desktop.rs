//! Desktop package installation and service enablement.
use anyhow::{Context as _, Result};

use super::{Context, Step, StepResult, done, pacman_install};
use crate::error::SetupError;

/// Number of output lines quoted when a service cannot be enabled.
const SERVICE_ERROR_LINES: usize = 3;

/// Install the desktop packages and enable its services.
#[derive(Debug)]
pub struct InstallDesktop;

impl Step for InstallDesktop {
    fn name(&self) -> &'static str {
        "Install desktop"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let packages = &ctx.manifest.packages;
        let services = &ctx.manifest.services.enable;
        if packages.desktop.is_empty() && packages.aur.is_empty() && services.is_empty() {
            return Ok(StepResult::Skipped("nothing to install".to_string()));
        }

        pacman_install(ctx, &packages.desktop).context("installing desktop packages")?;
        install_aur(ctx)?;
        enable_services(ctx)?;

        Ok(done(ctx))
    }
}

/// Install AUR packages through the helper, unprivileged.
fn install_aur(ctx: &Context) -> Result<()> {
    let aur = &ctx.manifest.packages.aur;
    if aur.is_empty() {
        return Ok(());
    }
    let helper = ctx.manifest.packages.aur_helper;
    if !ctx.dry_run && !ctx.runner.which(helper.program()) {
        return Err(SetupError::Platform(format!(
            "{helper} is not installed; run without skipping tools first"
        ))
        .into());
    }

    let mut args = vec!["-S", "--needed", "--noconfirm"];
    args.extend(aur.iter().map(String::as_str));
    ctx.log
        .info(&format!("installing {} AUR packages with {helper}", aur.len()));
    ctx.runner
        .run_interactive(None, helper.program(), &args, false)
        .context("installing AUR packages")?;
    Ok(())
}

/// Enable each service; failures are reported but do not stop the run.
fn enable_services(ctx: &Context) -> Result<()> {
    for unit in &ctx.manifest.services.enable {
        let result = ctx
            .runner
            .run_tolerant("systemctl", &["enable", unit], true)?;
        if result.success {
            ctx.log.info(&format!("enabled {unit}"));
        } else {
            ctx.log.warn(&format!(
                "could not enable {unit}: {}",
                result.output_tail(SERVICE_ERROR_LINES)
            ));
        }
    }
    Ok(())
}
