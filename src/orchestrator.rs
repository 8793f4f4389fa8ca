//! Sequential provisioning state machine.
//!
//! ```text
//! Init → SystemUpdated → ToolsInstalled → DesktopInstalled
//!      → RepoCloned → BackedUp → Installed → Finalized
//! ```
//!
//! Each state has exactly one entry action (a [`Step`]).  An unrecovered
//! error moves the machine to [`Stage::Failed`]; a declined consent prompt
//! stops it where it stands.
use anyhow::Result;

use crate::error::{EXIT_DECLINED, is_declined};
use crate::logging::StepStatus;
use crate::steps::backup::BackupConfigs;
use crate::steps::clone::CloneRepository;
use crate::steps::desktop::InstallDesktop;
use crate::steps::finalize::Finalize;
use crate::steps::install::InstallConfigs;
use crate::steps::preflight::Preflight;
use crate::steps::system::UpdateSystem;
use crate::steps::tools::InstallTools;
use crate::steps::{Context, Step, StepResult};

/// A state of the provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Starting state; entered with preflight checks.
    Init,
    /// The system packages are up to date.
    SystemUpdated,
    /// Base tools and the AUR helper are installed.
    ToolsInstalled,
    /// Desktop packages are installed and services enabled.
    DesktopInstalled,
    /// The configuration repository is cloned.
    RepoCloned,
    /// Existing configuration has been snapshotted.
    BackedUp,
    /// Repository configuration is in place.
    Installed,
    /// Assets are seeded and the run is reported.
    Finalized,
    /// Terminal state after an unrecovered error.
    Failed,
}

impl Stage {
    /// Every non-terminal-failure state, in execution order.
    pub const SEQUENCE: [Self; 8] = [
        Self::Init,
        Self::SystemUpdated,
        Self::ToolsInstalled,
        Self::DesktopInstalled,
        Self::RepoCloned,
        Self::BackedUp,
        Self::Installed,
        Self::Finalized,
    ];

    /// The state that follows this one on success.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::SystemUpdated),
            Self::SystemUpdated => Some(Self::ToolsInstalled),
            Self::ToolsInstalled => Some(Self::DesktopInstalled),
            Self::DesktopInstalled => Some(Self::RepoCloned),
            Self::RepoCloned => Some(Self::BackedUp),
            Self::BackedUp => Some(Self::Installed),
            Self::Installed => Some(Self::Finalized),
            Self::Finalized | Self::Failed => None,
        }
    }

    /// State name as shown in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::SystemUpdated => "SystemUpdated",
            Self::ToolsInstalled => "ToolsInstalled",
            Self::DesktopInstalled => "DesktopInstalled",
            Self::RepoCloned => "RepoCloned",
            Self::BackedUp => "BackedUp",
            Self::Installed => "Installed",
            Self::Finalized => "Finalized",
            Self::Failed => "Failed",
        }
    }

    /// The action performed on entering this state.
    #[must_use]
    pub fn entry_action(self) -> Option<&'static dyn Step> {
        match self {
            Self::Init => Some(&Preflight),
            Self::SystemUpdated => Some(&UpdateSystem),
            Self::ToolsInstalled => Some(&InstallTools),
            Self::DesktopInstalled => Some(&InstallDesktop),
            Self::RepoCloned => Some(&CloneRepository),
            Self::BackedUp => Some(&BackupConfigs),
            Self::Installed => Some(&InstallConfigs),
            Self::Finalized => Some(&Finalize),
            Self::Failed => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Package steps that `--skip` may bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SkippableStep {
    /// Full system upgrade.
    SystemUpdate,
    /// Base tools and the AUR helper.
    Tools,
    /// Desktop packages and services.
    Desktop,
}

impl SkippableStep {
    /// The state whose entry action this skips.
    #[must_use]
    pub const fn stage(self) -> Stage {
        match self {
            Self::SystemUpdate => Stage::SystemUpdated,
            Self::Tools => Stage::ToolsInstalled,
            Self::Desktop => Stage::DesktopInstalled,
        }
    }
}

/// How a run ended when no error escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every state was entered.
    Completed,
    /// The user declined at a prompt that required consent.
    Declined {
        /// State whose entry action asked.
        stage: Stage,
        /// What was declined.
        reason: String,
    },
}

impl RunOutcome {
    /// Process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Declined { .. } => EXIT_DECLINED,
        }
    }
}

/// Drives a [`Context`] through [`Stage::SEQUENCE`].
#[derive(Debug)]
pub struct Orchestrator {
    skip: Vec<SkippableStep>,
    stage: Stage,
}

impl Orchestrator {
    /// Create an orchestrator that bypasses `skip`.
    #[must_use]
    pub const fn new(skip: Vec<SkippableStep>) -> Self {
        Self {
            skip,
            stage: Stage::Init,
        }
    }

    /// The state most recently entered.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    fn is_skipped(&self, stage: Stage) -> bool {
        self.skip.iter().any(|s| s.stage() == stage)
    }

    /// Run every state's entry action in order.
    ///
    /// Each action is recorded in the run summary.  A declined consent prompt
    /// ends the run with [`RunOutcome::Declined`].
    ///
    /// # Errors
    ///
    /// Returns the first unrecovered step error; the machine is then in
    /// [`Stage::Failed`].
    pub fn run(&mut self, ctx: &mut Context) -> Result<RunOutcome> {
        let mut current = Some(Stage::Init);
        while let Some(stage) = current {
            ctx.log
                .debug(&format!("state: {} -> {stage}", self.stage));
            self.stage = stage;

            let Some(step) = stage.entry_action() else {
                break;
            };
            if self.is_skipped(stage) {
                ctx.log
                    .debug(&format!("skipping step: {} (--skip)", step.name()));
                ctx.log
                    .record_step(step.name(), StepStatus::Skipped, Some("skipped by --skip"));
                current = stage.next();
                continue;
            }

            ctx.log.stage(step.name());
            match step.run(ctx) {
                Ok(StepResult::Ok) => {
                    ctx.log.record_step(step.name(), StepStatus::Ok, None);
                }
                Ok(StepResult::Skipped(reason)) => {
                    ctx.log.info(&format!("skipped: {reason}"));
                    ctx.log
                        .record_step(step.name(), StepStatus::Skipped, Some(&reason));
                }
                Ok(StepResult::DryRun) => {
                    ctx.log.record_step(step.name(), StepStatus::DryRun, None);
                }
                Err(e) if is_declined(&e) => {
                    let reason = format!("{e:#}");
                    ctx.log.warn(&format!("{}: {reason}", step.name()));
                    ctx.log
                        .record_step(step.name(), StepStatus::Declined, Some(&reason));
                    return Ok(RunOutcome::Declined { stage, reason });
                }
                Err(e) => {
                    ctx.log.error(&format!("{}: {e:#}", step.name()));
                    ctx.log
                        .record_step(step.name(), StepStatus::Failed, Some(&format!("{e:#}")));
                    self.stage = Stage::Failed;
                    return Err(e);
                }
            }
            current = stage.next();
        }
        Ok(RunOutcome::Completed)
    }
}
