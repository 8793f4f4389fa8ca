//! Hyprland desktop provisioning engine.
//!
//! Installs the packages a Hyprland desktop needs on an Arch-based system,
//! clones a configuration repository, snapshots the user's current
//! configuration and installs the repository's configuration in its place.
//! What gets installed is driven by a flavor manifest in `conf/flavors/`.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** — parse and validate flavor manifests
//! - **[`sync`]** — backup snapshots, layout detection and config copying
//! - **[`steps`]** — the entry action of each provisioning state
//! - **[`orchestrator`]** — the sequential state machine driving the steps
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod operations;
pub mod orchestrator;
pub mod platform;
pub mod prompt;
pub mod steps;
pub mod sync;

/// Scriptable fakes for the side-effect seams.
#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]
pub(crate) mod test_support {
    use anyhow::Result;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use crate::exec::{ExecResult, Executor};
    use crate::fetch::Downloader;

    /// [`Executor`] that records command lines and returns scripted results.
    ///
    /// Every command succeeds unless its program was registered with
    /// [`fail_on`](Self::fail_on).  `which` only knows programs added with
    /// [`with_program`](Self::with_program).  Interactive runs are recorded in
    /// both [`calls`](Self::calls) and [`interactive_calls`](Self::interactive_calls)
    /// and, like the real terminal, capture no output.
    #[derive(Debug, Default)]
    pub struct FakeExecutor {
        calls: Mutex<Vec<String>>,
        interactive: Mutex<Vec<String>>,
        failures: Vec<(String, i32, String)>,
        programs: Vec<String>,
        clone_contents: Vec<(String, String)>,
    }

    impl FakeExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make `program` (directly or under `sudo`) exit with `code`.
        pub fn fail_on(mut self, program: &str, code: i32, output: &str) -> Self {
            self.failures
                .push((program.to_string(), code, output.to_string()));
            self
        }

        /// Report `program` as present on `PATH`.
        pub fn with_program(mut self, program: &str) -> Self {
            self.programs.push(program.to_string());
            self
        }

        /// Populate the destination of every `git clone` with `files`.
        pub fn with_clone_contents(mut self, files: &[(&str, &str)]) -> Self {
            self.clone_contents = files
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect();
            self
        }

        /// Command lines executed so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Command lines run attached to the terminal, in order.
        pub fn interactive_calls(&self) -> Vec<String> {
            self.interactive.lock().unwrap().clone()
        }

        fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
            let mut line = vec![program];
            line.extend_from_slice(args);
            self.calls.lock().unwrap().push(line.join(" "));

            let target = if program == "sudo" {
                args.first().copied().unwrap_or(program)
            } else {
                program
            };
            if let Some((_, code, output)) = self.failures.iter().find(|(p, ..)| p == target) {
                return ExecResult {
                    stdout: output.clone(),
                    stderr: String::new(),
                    success: false,
                    code: Some(*code),
                };
            }

            if program == "git"
                && args.first() == Some(&"clone")
                && let Some(dest) = args.last()
            {
                for (rel, content) in &self.clone_contents {
                    let path = Path::new(dest).join(rel);
                    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                    std::fs::write(path, content).unwrap();
                }
            }
            ExecResult::synthetic_success()
        }
    }

    impl Executor for FakeExecutor {
        fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            Ok(self.respond(program, args))
        }

        fn run_interactive(
            &self,
            _dir: Option<&Path>,
            program: &str,
            args: &[&str],
        ) -> Result<ExecResult> {
            let mut line = vec![program];
            line.extend_from_slice(args);
            self.interactive.lock().unwrap().push(line.join(" "));
            let result = self.respond(program, args);
            Ok(ExecResult {
                stdout: String::new(),
                stderr: String::new(),
                ..result
            })
        }

        fn which(&self, program: &str) -> bool {
            self.programs.iter().any(|p| p == program)
        }
    }

    /// [`Downloader`] that writes a placeholder file instead of using the network.
    #[derive(Debug, Default)]
    pub struct FakeDownloader {
        requests: Mutex<Vec<(String, PathBuf)>>,
        fail: bool,
    }

    impl FakeDownloader {
        /// A downloader whose every request fails.
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// `(url, dest)` pairs requested so far.
        pub fn requests(&self) -> Vec<(String, PathBuf)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Downloader for FakeDownloader {
        fn download(&self, url: &str, dest: &Path) -> Result<()> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), dest.to_path_buf()));
            if self.fail {
                anyhow::bail!("connection refused: {url}");
            }
            crate::sync::fs::ensure_parent_dir(dest)?;
            std::fs::write(dest, b"\x89PNG")?;
            Ok(())
        }
    }
}
