//! Final assets and the closing report.
use anyhow::Result;

use super::{Context, Step, StepResult, done};
use crate::fetch::file_name_from_url;
use crate::sync::fs::contains_files;

/// File name used when the fallback URL does not end in one.
const DEFAULT_WALLPAPER_NAME: &str = "default-wallpaper.png";

/// Make sure a wallpaper exists and report where everything went.
#[derive(Debug)]
pub struct Finalize;

impl Step for Finalize {
    fn name(&self) -> &'static str {
        "Finalize"
    }

    fn run(&self, ctx: &mut Context) -> Result<StepResult> {
        ensure_wallpaper(ctx);

        if let Some(report) = &ctx.report {
            ctx.log.info(&format!(
                "configs: {} installed, {} skipped",
                report.copied_count(),
                report.skipped_count()
            ));
        }
        match &ctx.snapshot {
            Some(snapshot) => ctx.log.info(&format!(
                "previous configuration saved in {}",
                snapshot.backup_dir.display()
            )),
            None => ctx.log.debug("no backup was taken"),
        }
        ctx.log
            .info("log out and pick Hyprland in your display manager to start the new session");

        Ok(done(ctx))
    }
}

/// Download the fallback wallpaper into an empty wallpaper directory.
/// Failure is only a warning.
fn ensure_wallpaper(ctx: &Context) {
    let dir = ctx.targets.home.join(&ctx.manifest.assets.wallpapers);
    if contains_files(&dir) {
        ctx.log.debug(&format!("{} already has wallpapers", dir.display()));
        return;
    }
    let Some(url) = &ctx.manifest.assets.fallback_wallpaper_url else {
        ctx.log.debug("wallpaper directory is empty and no fallback is configured");
        return;
    };

    let dest = dir.join(file_name_from_url(url, DEFAULT_WALLPAPER_NAME));
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("download {url} -> {}", dest.display()));
        return;
    }
    match ctx.downloader.download(url, &dest) {
        Ok(()) => ctx
            .log
            .info(&format!("downloaded fallback wallpaper to {}", dest.display())),
        Err(e) => ctx
            .log
            .warn(&format!("could not download fallback wallpaper: {e:#}")),
    }
}
