//! Checks made before anything is changed.
use anyhow::Result;

use super::{Context, Step, StepResult, done};
use crate::config::validation::validate_all;
use crate::error::SetupError;

/// Validate the manifest and host, then ask for consent to proceed.
#[derive(Debug)]
pub struct Preflight;

impl Step for Preflight {
    fn name(&self) -> &'static str {
        "Preflight checks"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        let flavor = &ctx.manifest.flavor;
        ctx.log.info(&format!("flavor: {} ({})", flavor.name, flavor.description));
        ctx.log
            .info(&format!("home: {}", ctx.targets.home.display()));

        let warnings = validate_all(&ctx.manifest, &ctx.platform);
        for warning in &warnings {
            ctx.log.warn(&warning.to_string());
        }
        ctx.log
            .debug(&format!("manifest validation: {} warnings", warnings.len()));

        if ctx.platform.is_root {
            return Err(SetupError::Platform(
                "refusing to run as root; run as a regular user (sudo is used where needed)"
                    .to_string(),
            )
            .into());
        }

        if !ctx.runner.which("pacman") {
            if ctx.dry_run {
                ctx.log
                    .warn("pacman not found; continuing because this is a dry run");
            } else {
                return Err(SetupError::Platform(
                    "pacman not found; an Arch-based system is required".to_string(),
                )
                .into());
            }
        }

        let question = format!("Proceed with the '{}' flavor?", ctx.manifest.flavor.name);
        if !ctx.prompt.confirm(&question) {
            return Err(SetupError::UserDeclined("installation not confirmed".to_string()).into());
        }

        Ok(done(ctx))
    }
}
