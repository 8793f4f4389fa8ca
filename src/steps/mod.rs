//! Entry actions of the provisioning state machine.
//!
//! Each step is the action performed on entering one orchestrator state.
//! Steps run strictly in sequence and communicate through [`Context`].
pub mod backup;
pub mod clone;
pub mod context;
pub mod desktop;
pub mod finalize;
pub mod install;
pub mod preflight;
pub mod system;
pub mod tools;

pub use context::{BackupMarker, Context};

use anyhow::Result;

/// Result of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Step completed successfully.
    Ok,
    /// Step had nothing to do.
    Skipped(String),
    /// Step ran in dry-run mode.
    DryRun,
}

/// A named entry action.
pub trait Step {
    /// Human-readable step name.
    fn name(&self) -> &'static str;

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if a delegated command fails, the filesystem cannot
    /// be updated, or the user declines where consent is required.
    fn run(&self, ctx: &mut Context) -> Result<StepResult>;
}

/// `Ok` or `DryRun` depending on the mode.
const fn done(ctx: &Context) -> StepResult {
    if ctx.dry_run {
        StepResult::DryRun
    } else {
        StepResult::Ok
    }
}

/// Install `packages` from the official repositories, skipping when empty.
fn pacman_install(ctx: &Context, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let mut args = vec!["-S", "--needed", "--noconfirm"];
    args.extend(packages.iter().map(String::as_str));
    ctx.log.info(&format!("installing {} packages", packages.len()));
    ctx.runner.run_interactive(None, "pacman", &args, true)?;
    Ok(())
}
