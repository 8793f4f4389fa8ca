//! `hyprsetup` command-line entry point.

use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use hyprsetup_cli::cli::{Cli, VERSION};
use hyprsetup_cli::config::{self, Manifest};
use hyprsetup_cli::error::{EXIT_INTERRUPTED, exit_code_for};
use hyprsetup_cli::exec::{CommandRunner, SystemExecutor};
use hyprsetup_cli::fetch::HttpDownloader;
use hyprsetup_cli::logging::{self, Log, Logger};
use hyprsetup_cli::operations::SystemFileSystemOps;
use hyprsetup_cli::orchestrator::{Orchestrator, RunOutcome};
use hyprsetup_cli::platform::Platform;
use hyprsetup_cli::prompt::PromptGate;
use hyprsetup_cli::steps::{BackupMarker, Context};
use hyprsetup_cli::sync::InstallTargets;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let log_file = logging::init_subscriber(args.verbose, "install");

    let code = match run(&args, log_file) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            exit_code_for(&e)
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Run the provisioning sequence and return the process exit code.
fn run(args: &Cli, log_file: Option<PathBuf>) -> Result<i32> {
    if args.list_flavors {
        print_flavors()?;
        return Ok(0);
    }

    let logger = Arc::new(Logger::new().with_log_file(log_file));
    let log: Arc<dyn Log> = Arc::clone(&logger) as Arc<dyn Log>;
    log.info(&format!("hyprsetup {VERSION}"));

    let mut manifest = args.manifest_source().load()?;
    if let Some(url) = &args.repo {
        manifest.source.url.clone_from(url);
    }

    let backup_marker: BackupMarker = Arc::new(Mutex::new(None));
    install_interrupt_handler(&backup_marker, &log);

    let mut ctx = build_context(args, manifest, &log, backup_marker)?;
    if ctx.dry_run {
        log.warn("dry run: no changes will be made");
    }

    let outcome = Orchestrator::new(args.skip.clone()).run(&mut ctx);
    logger.print_summary();

    match outcome {
        Ok(outcome) => {
            if let RunOutcome::Declined { stage, .. } = &outcome {
                log.warn(&format!("stopped at {stage}: nothing further was changed"));
            }
            Ok(outcome.exit_code())
        }
        Err(e) => Ok(exit_code_for(&e)),
    }
}

/// List the built-in flavors on stdout.
#[allow(clippy::print_stdout)]
fn print_flavors() -> Result<()> {
    for manifest in config::builtin_manifests()? {
        println!("{:<10} {}", manifest.flavor.name, manifest.flavor.description);
    }
    Ok(())
}

fn build_context(
    args: &Cli,
    manifest: Manifest,
    log: &Arc<dyn Log>,
    backup_marker: BackupMarker,
) -> Result<Context> {
    let home = resolve_home(args)?;
    let prompt = if args.yes {
        PromptGate::assume(true, Arc::clone(log))
    } else {
        PromptGate::interactive(Arc::clone(log))
    };
    Ok(Context {
        manifest,
        platform: Platform::detect(),
        log: Arc::clone(log),
        runner: CommandRunner::new(Arc::new(SystemExecutor), Arc::clone(log), args.dry_run),
        prompt: Arc::new(prompt),
        fs_ops: Arc::new(SystemFileSystemOps),
        downloader: Arc::new(HttpDownloader),
        targets: InstallTargets::for_home(&home),
        dry_run: args.dry_run,
        snapshot: None,
        report: None,
        backup_marker,
    })
}

/// Resolve the home directory from `--home` or `$HOME`.
fn resolve_home(args: &Cli) -> Result<PathBuf> {
    if let Some(home) = &args.home {
        return Ok(home.clone());
    }
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .context("cannot determine home directory. Use --home or set HOME")
}

/// Exit with [`EXIT_INTERRUPTED`] on Ctrl-C, naming the backup if one exists.
fn install_interrupt_handler(marker: &BackupMarker, log: &Arc<dyn Log>) {
    let marker = Arc::clone(marker);
    let handler_log = Arc::clone(log);
    let result = ctrlc::set_handler(move || {
        handler_log.warn("interrupted; the system may be partially configured");
        if let Some(dir) = marker.lock().ok().and_then(|m| m.clone()) {
            handler_log.warn(&format!("previous configuration is saved in {}", dir.display()));
        }
        std::process::exit(EXIT_INTERRUPTED);
    });
    if let Err(e) = result {
        log.debug(&format!("cannot install interrupt handler: {e}"));
    }
}
