//! External command execution.
//!
//! [`Executor`] is the injectable seam over `std::process::Command`;
//! [`CommandRunner`] layers privilege escalation, dry-run and typed
//! [`SetupError::ExternalCommand`] failures on top of it.
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, ExitStatus, Output};
use std::sync::Arc;

use crate::error::SetupError;
use crate::logging::Log;

/// Number of trailing output lines kept in an [`SetupError::ExternalCommand`].
const OUTPUT_TAIL_LINES: usize = 20;

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output (empty for interactive runs).
    pub stdout: String,
    /// Captured standard error (empty for interactive runs).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl From<ExitStatus> for ExecResult {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
            ..Self::default()
        }
    }
}

impl ExecResult {
    /// A synthetic successful result, used for dry-run invocations.
    #[must_use]
    pub fn synthetic_success() -> Self {
        Self {
            success: true,
            code: Some(0),
            ..Self::default()
        }
    }

    /// The last `max` lines of combined stdout and stderr.
    #[must_use]
    pub fn output_tail(&self, max: usize) -> String {
        let lines: Vec<&str> = self
            .stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();
        let start = lines.len().saturating_sub(max);
        lines.get(start..).unwrap_or_default().join("\n")
    }
}

/// Abstraction over process spawning so tests can substitute canned results.
///
/// Implementations never fail on a non-zero exit status; they only fail when
/// the process cannot be spawned at all.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run `program` with `args` and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run `program` with `args` attached to the terminal.
    ///
    /// Standard streams are inherited, so nothing is captured; the result
    /// carries only the exit status.  `dir` sets the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run_interactive(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[&str],
    ) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] that spawns real processes.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_interactive(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[&str],
    ) -> Result<ExecResult> {
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        let status = command
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(status))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Render a command line for logs and error messages.
fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs external commands on behalf of orchestration steps.
///
/// Privileged commands are prefixed with `sudo`.  In dry-run mode every
/// invocation is logged and reported as successful without being executed.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    executor: Arc<dyn Executor>,
    log: Arc<dyn Log>,
    dry_run: bool,
}

impl CommandRunner {
    /// Create a runner over `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, log: Arc<dyn Log>, dry_run: bool) -> Self {
        Self {
            executor,
            log,
            dry_run,
        }
    }

    /// Check if `program` is available on `PATH`.
    ///
    /// Probing is read-only, so it happens in dry-run mode too.
    #[must_use]
    pub fn which(&self, program: &str) -> bool {
        self.executor.which(program)
    }

    /// Run a command, failing with [`SetupError::ExternalCommand`] on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    pub fn run(&self, program: &str, args: &[&str], privileged: bool) -> Result<ExecResult> {
        let result = self.run_tolerant(program, args, privileged)?;
        check(result, program, args, privileged)
    }

    /// Run a command on the terminal, failing on non-zero exit.
    ///
    /// The command shares the terminal, so it can prompt (including for the
    /// `sudo` password) and its progress is shown as it happens.  Used for
    /// package transactions and installer scripts.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exits non-zero.
    pub fn run_interactive(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[&str],
        privileged: bool,
    ) -> Result<ExecResult> {
        let (program_eff, args_eff) = elevate(program, args, privileged);
        let line = command_line(program_eff, &args_eff);
        let line = match dir {
            Some(dir) => format!("(in {}) {line}", dir.display()),
            None => line,
        };
        if self.dry_run {
            self.log.dry_run(&line);
            return Ok(ExecResult::synthetic_success());
        }
        self.log.debug(&format!("exec (interactive): {line}"));
        let result = self.executor.run_interactive(dir, program_eff, &args_eff)?;
        check(result, program, args, privileged)
    }

    /// Run a command and return its result even when it exits non-zero.
    ///
    /// Used where failure is expected and harmless, e.g. enabling a service
    /// that is already enabled.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    pub fn run_tolerant(&self, program: &str, args: &[&str], privileged: bool) -> Result<ExecResult> {
        let (program_eff, args_eff) = elevate(program, args, privileged);
        let line = command_line(program_eff, &args_eff);
        if self.dry_run {
            self.log.dry_run(&line);
            return Ok(ExecResult::synthetic_success());
        }
        self.log.debug(&format!("exec: {line}"));
        let result = self.executor.run_unchecked(program_eff, &args_eff)?;
        if !result.success {
            self.log.debug(&format!(
                "{line} exited with {}",
                result.code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            ));
        }
        Ok(result)
    }
}

/// Prefix `sudo` onto privileged invocations.
fn elevate<'a>(program: &'a str, args: &[&'a str], privileged: bool) -> (&'a str, Vec<&'a str>) {
    if privileged {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(program);
        full.extend_from_slice(args);
        ("sudo", full)
    } else {
        (program, args.to_vec())
    }
}

fn check(result: ExecResult, program: &str, args: &[&str], privileged: bool) -> Result<ExecResult> {
    if result.success {
        return Ok(result);
    }
    let (program_eff, args_eff) = elevate(program, args, privileged);
    Err(SetupError::ExternalCommand {
        command: command_line(program_eff, &args_eff),
        code: result.code,
        output: result.output_tail(OUTPUT_TAIL_LINES),
    }
    .into())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use crate::test_support::FakeExecutor;

    fn runner(executor: &Arc<FakeExecutor>, dry_run: bool) -> CommandRunner {
        CommandRunner::new(
            Arc::clone(executor) as Arc<dyn Executor>,
            Arc::new(Logger::new()),
            dry_run,
        )
    }

    #[test]
    fn privileged_commands_are_prefixed_with_sudo() {
        let fake = Arc::new(FakeExecutor::new());
        runner(&fake, false)
            .run("pacman", &["-Syu", "--noconfirm"], true)
            .unwrap();
        assert_eq!(fake.calls(), vec!["sudo pacman -Syu --noconfirm"]);
    }

    #[test]
    fn unprivileged_commands_run_as_is() {
        let fake = Arc::new(FakeExecutor::new());
        runner(&fake, false)
            .run("git", &["clone", "url", "dir"], false)
            .unwrap();
        assert_eq!(fake.calls(), vec!["git clone url dir"]);
    }

    #[test]
    fn non_zero_exit_becomes_external_command_error() {
        let fake = Arc::new(FakeExecutor::new().fail_on("pacman", 8, "line1\nline2\n"));
        let err = runner(&fake, false)
            .run("pacman", &["-Syu"], true)
            .unwrap_err();
        match err.downcast_ref::<SetupError>() {
            Some(SetupError::ExternalCommand {
                command,
                code,
                output,
            }) => {
                assert_eq!(command, "sudo pacman -Syu");
                assert_eq!(*code, Some(8));
                assert_eq!(output, "line1\nline2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn interactive_runs_are_attached_and_keep_exit_status() {
        let fake = Arc::new(FakeExecutor::new().fail_on("bash", 42, "never captured"));
        let r = runner(&fake, false);
        r.run_interactive(None, "pacman", &["-S", "--needed", "waybar"], true)
            .unwrap();
        let err = r
            .run_interactive(Some(Path::new("/tmp/rice")), "bash", &["install.sh"], false)
            .unwrap_err();

        assert_eq!(
            fake.interactive_calls(),
            vec!["sudo pacman -S --needed waybar", "bash install.sh"]
        );
        match err.downcast_ref::<SetupError>() {
            Some(SetupError::ExternalCommand { command, code, output }) => {
                assert_eq!(command, "bash install.sh");
                assert_eq!(*code, Some(42));
                assert!(output.is_empty(), "terminal output is not captured");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tolerant_run_returns_failed_result() {
        let fake = Arc::new(FakeExecutor::new().fail_on("systemctl", 1, "already enabled"));
        let result = runner(&fake, false)
            .run_tolerant("systemctl", &["enable", "sddm.service"], true)
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.code, Some(1));
    }

    #[test]
    fn dry_run_executes_nothing() {
        let fake = Arc::new(FakeExecutor::new().fail_on("pacman", 1, ""));
        let r = runner(&fake, true);
        let result = r.run("pacman", &["-Syu"], true).unwrap();
        assert!(result.success);
        r.run_interactive(Some(Path::new("/tmp")), "makepkg", &["-si"], false)
            .unwrap();
        assert!(fake.calls().is_empty(), "dry-run must not spawn processes");
    }

    #[test]
    fn which_is_probed_in_dry_run() {
        let fake = Arc::new(FakeExecutor::new().with_program("yay"));
        let r = runner(&fake, true);
        assert!(r.which("yay"));
        assert!(!r.which("paru"));
    }

    #[test]
    fn output_tail_keeps_last_lines() {
        let result = ExecResult {
            stdout: (1..=30).map(|n| format!("out{n}\n")).collect(),
            stderr: "err\n".to_string(),
            success: false,
            code: Some(1),
        };
        let tail = result.output_tail(3);
        assert_eq!(tail, "out29\nout30\nerr");
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_runs_real_commands() {
        let exec = SystemExecutor;
        let ok = exec.run_unchecked("echo", &["hello"]).unwrap();
        assert!(ok.success);
        assert_eq!(ok.stdout.trim(), "hello");

        let failed = exec.run_unchecked("false", &[]).unwrap();
        assert!(!failed.success);
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_interactive_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("install.sh"), "exit 7\n").unwrap();
        let exec = SystemExecutor;

        let failed = exec
            .run_interactive(Some(dir.path()), "sh", &["install.sh"])
            .unwrap();
        assert!(!failed.success);
        assert_eq!(failed.code, Some(7));
        assert!(failed.stdout.is_empty());

        let ok = exec.run_interactive(None, "true", &[]).unwrap();
        assert!(ok.success);
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_which() {
        let exec = SystemExecutor;
        assert!(exec.which("sh"));
        assert!(!exec.which("this-program-does-not-exist-12345"));
    }
}
