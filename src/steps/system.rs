//! Full system upgrade.
use anyhow::{Context as _, Result};

use super::{Context, Step, StepResult, done};

/// Full system upgrade before anything is installed.
#[derive(Debug)]
pub struct UpdateSystem;

impl Step for UpdateSystem {
    fn name(&self) -> &'static str {
        "Update system"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        ctx.log.info("synchronizing package databases and upgrading");
        ctx.runner
            .run_interactive(None, "pacman", &["-Syu", "--noconfirm"], true)
            .context("system upgrade")?;
        Ok(done(ctx))
    }
}
