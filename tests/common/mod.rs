// Shared helpers for integration tests.
//
// Provides a temporary home directory, a repository builder and a scripted
// executor so each integration test can drive the engine without touching
// the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use hyprsetup_cli::config::{Manifest, ManifestSource};
use hyprsetup_cli::exec::{CommandRunner, ExecResult, Executor};
use hyprsetup_cli::fetch::Downloader;
use hyprsetup_cli::logging::{Log, Logger};
use hyprsetup_cli::operations::SystemFileSystemOps;
use hyprsetup_cli::platform::Platform;
use hyprsetup_cli::prompt::PromptGate;
use hyprsetup_cli::steps::Context;
use hyprsetup_cli::sync::InstallTargets;

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("file has a parent")).expect("create parent");
    std::fs::write(&path, content).expect("write file");
    path
}

/// The built-in `minimal` flavor manifest.
pub fn minimal_manifest() -> Manifest {
    ManifestSource::Builtin("minimal".to_string())
        .load()
        .expect("minimal flavor loads")
}

/// A logger shared as `Arc<dyn Log>`.
pub fn test_log() -> Arc<dyn Log> {
    Arc::new(Logger::new())
}

/// A temporary home directory and a configuration repository outside it.
pub struct TestHome {
    pub home: tempfile::TempDir,
    pub repo: tempfile::TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create home"),
            repo: tempfile::tempdir().expect("create repo"),
        }
    }

    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    pub fn repo_path(&self) -> &Path {
        self.repo.path()
    }

    pub fn targets(&self) -> InstallTargets {
        InstallTargets::for_home(self.home.path())
    }

    /// Add a file to the repository.
    pub fn with_repo_file(self, rel: &str, content: &str) -> Self {
        write_file(self.repo.path(), rel, content);
        self
    }

    /// Add a file to the user's configuration root.
    pub fn with_user_config(self, rel: &str, content: &str) -> Self {
        write_file(&self.home.path().join(".config"), rel, content);
        self
    }
}

/// [`Executor`] that records command lines and never spawns anything.
///
/// `git clone` populates its destination with the configured files so the
/// later states see a repository.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<String>>,
    failing: Vec<(String, i32)>,
    programs: Vec<String>,
    repo_files: Vec<(String, String)>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `program` (directly or under `sudo`) exit with `code`.
    pub fn failing(mut self, program: &str, code: i32) -> Self {
        self.failing.push((program.to_string(), code));
        self
    }

    /// Report `program` as installed.
    pub fn installed(mut self, program: &str) -> Self {
        self.programs.push(program.to_string());
        self
    }

    /// Files a `git clone` creates, relative to the clone directory.
    pub fn cloning(mut self, rel: &str, content: &str) -> Self {
        self.repo_files.push((rel.to_string(), content.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().expect("calls lock").push(line);

        let target = if program == "sudo" {
            args.first().copied().unwrap_or(program)
        } else {
            program
        };
        if let Some((_, code)) = self.failing.iter().find(|(p, _)| p == target) {
            return ExecResult {
                stderr: format!("{target}: scripted failure"),
                code: Some(*code),
                ..ExecResult::default()
            };
        }
        if program == "git"
            && args.first() == Some(&"clone")
            && let Some(dest) = args.last()
        {
            for (rel, content) in &self.repo_files {
                write_file(Path::new(dest), rel, content);
            }
        }
        ExecResult::synthetic_success()
    }
}

impl Executor for ScriptedExecutor {
    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.respond(program, args))
    }

    fn run_interactive(
        &self,
        _dir: Option<&Path>,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<ExecResult> {
        Ok(self.respond(program, args))
    }

    fn which(&self, program: &str) -> bool {
        self.programs.iter().any(|p| p == program)
    }
}

/// [`Downloader`] that never touches the network.
#[derive(Debug, Default)]
pub struct OfflineDownloader;

impl Downloader for OfflineDownloader {
    fn download(&self, url: &str, _dest: &Path) -> anyhow::Result<()> {
        anyhow::bail!("offline: {url}")
    }
}

/// Build a [`Context`] for `home` with a fixed prompt answer.
pub fn context(
    home: &Path,
    executor: &Arc<ScriptedExecutor>,
    answer: bool,
    dry_run: bool,
) -> (Context, Arc<Logger>) {
    let logger = Arc::new(Logger::new());
    let log: Arc<dyn Log> = Arc::clone(&logger) as Arc<dyn Log>;
    let ctx = Context {
        manifest: minimal_manifest(),
        platform: Platform::new(true, false),
        runner: CommandRunner::new(
            Arc::clone(executor) as Arc<dyn Executor>,
            Arc::clone(&log),
            dry_run,
        ),
        prompt: Arc::new(PromptGate::assume(answer, Arc::clone(&log))),
        fs_ops: Arc::new(SystemFileSystemOps),
        downloader: Arc::new(OfflineDownloader),
        targets: InstallTargets::for_home(home),
        dry_run,
        snapshot: None,
        report: None,
        backup_marker: Arc::new(Mutex::new(None)),
        log,
    };
    (ctx, logger)
}
