#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]
//! Integration tests for the provisioning state machine.
//!
//! These tests drive [`Orchestrator`] through the public API with a scripted
//! executor, checking the state sequence, recorded step results and the exit
//! codes a run maps to.

mod common;

use std::sync::Arc;

use common::{ScriptedExecutor, context, write_file};
use hyprsetup_cli::error::{EXIT_DECLINED, exit_code_for};
use hyprsetup_cli::logging::StepStatus;
use hyprsetup_cli::orchestrator::{Orchestrator, RunOutcome, SkippableStep, Stage};

// ---------------------------------------------------------------------------
// Snapshot: state sequence
// ---------------------------------------------------------------------------

/// Snapshot of every state and its entry action, in order.
#[test]
fn stage_sequence() {
    let lines: Vec<String> = Stage::SEQUENCE
        .iter()
        .map(|stage| {
            let action = stage.entry_action().map_or("-", |step| step.name());
            format!("{stage}: {action}")
        })
        .collect();
    insta::assert_snapshot!("stage_sequence", lines.join("\n"));
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

#[test]
fn full_run_provisions_home() {
    let home = tempfile::tempdir().unwrap();
    let exec = Arc::new(
        ScriptedExecutor::new()
            .installed("pacman")
            .installed("yay")
            .cloning(".config/hypr/hyprland.conf", "upstream")
            .cloning(".config/hypr/scripts/wallpaper.sh", "#!/bin/sh")
            .cloning(".config/waybar/config", "{}"),
    );
    write_file(&home.path().join(".config"), "hypr/hyprland.conf", "mine");
    let (mut ctx, logger) = context(home.path(), &exec, true, false);

    let mut orchestrator = Orchestrator::new(vec![]);
    let outcome = orchestrator.run(&mut ctx).unwrap();

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(orchestrator.stage(), Stage::Finalized);
    assert!(
        logger
            .step_entries()
            .iter()
            .all(|e| e.status != StepStatus::Failed)
    );

    let calls = exec.calls();
    assert_eq!(calls[0], "sudo pacman -Syu --noconfirm");
    assert!(calls.iter().any(|c| c.starts_with("git clone --depth 1 ")));

    let config = home.path().join(".config");
    assert_eq!(
        std::fs::read_to_string(config.join("hypr/hyprland.conf")).unwrap(),
        "upstream"
    );
    let snapshot = ctx.snapshot.as_ref().expect("backup taken");
    assert_eq!(
        std::fs::read_to_string(snapshot.backup_dir.join("hypr/hyprland.conf")).unwrap(),
        "mine"
    );
    assert_eq!(
        ctx.backup_marker.lock().unwrap().as_ref(),
        Some(&snapshot.backup_dir)
    );
    assert!(home.path().join("Pictures/Wallpapers").is_dir());
}

#[test]
fn skipping_package_steps_keeps_the_sequence() {
    let home = tempfile::tempdir().unwrap();
    let exec = Arc::new(
        ScriptedExecutor::new()
            .installed("pacman")
            .cloning("config/kitty/kitty.conf", "font_size 11"),
    );
    let (mut ctx, logger) = context(home.path(), &exec, true, false);

    let mut orchestrator = Orchestrator::new(vec![
        SkippableStep::SystemUpdate,
        SkippableStep::Tools,
        SkippableStep::Desktop,
    ]);
    assert_eq!(orchestrator.run(&mut ctx).unwrap(), RunOutcome::Completed);

    let statuses: Vec<StepStatus> = logger.step_entries().iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            StepStatus::Ok,
            StepStatus::Skipped,
            StepStatus::Skipped,
            StepStatus::Skipped,
            StepStatus::Ok,
            StepStatus::Ok,
            StepStatus::Ok,
            StepStatus::Ok,
        ]
    );
    assert!(home.path().join(".config/kitty/kitty.conf").is_file());
}

#[test]
fn declining_maps_to_exit_code_three() {
    let home = tempfile::tempdir().unwrap();
    let exec = Arc::new(ScriptedExecutor::new().installed("pacman"));
    let (mut ctx, _) = context(home.path(), &exec, false, false);

    let outcome = Orchestrator::new(vec![]).run(&mut ctx).unwrap();
    assert!(matches!(
        outcome,
        RunOutcome::Declined {
            stage: Stage::Init,
            ..
        }
    ));
    assert_eq!(outcome.exit_code(), EXIT_DECLINED);
    assert_eq!(EXIT_DECLINED, 3);
    assert!(exec.calls().is_empty());
}

#[test]
fn failing_command_propagates_its_status() {
    let home = tempfile::tempdir().unwrap();
    let exec = Arc::new(
        ScriptedExecutor::new()
            .installed("pacman")
            .installed("yay")
            .failing("git", 128),
    );
    let (mut ctx, logger) = context(home.path(), &exec, true, false);

    let mut orchestrator = Orchestrator::new(vec![]);
    let err = orchestrator.run(&mut ctx).unwrap_err();

    assert_eq!(orchestrator.stage(), Stage::Failed);
    assert_eq!(exit_code_for(&err), 128);
    let last = logger.step_entries().pop().unwrap();
    assert_eq!(last.name, "Clone repository");
    assert_eq!(last.status, StepStatus::Failed);
    assert!(ctx.snapshot.is_none());
    assert!(!home.path().join(".config").exists());
}

#[test]
fn dry_run_touches_nothing() {
    let home = tempfile::tempdir().unwrap();
    let exec = Arc::new(ScriptedExecutor::new());
    let (mut ctx, logger) = context(home.path(), &exec, true, true);

    assert_eq!(
        Orchestrator::new(vec![]).run(&mut ctx).unwrap(),
        RunOutcome::Completed
    );
    assert!(exec.calls().is_empty());
    assert_eq!(std::fs::read_dir(home.path()).unwrap().count(), 0);
    assert_eq!(logger.step_entries().len(), Stage::SEQUENCE.len());
}
