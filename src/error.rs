//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules attach context with [`anyhow`], but every failure that
//! changes control flow or the process exit code is raised as a typed
//! [`SetupError`] so the orchestrator can tell them apart.
//!
//! # Error taxonomy
//!
//! ```text
//! SetupError
//! ├── ExternalCommand   — a delegated command exited non-zero (fatal)
//! ├── MissingSource     — a planned copy source is absent (recovered as skip)
//! ├── UserDeclined      — a prompt was answered "no" where consent was needed
//! ├── InvalidConfigName — a manifest config name is not a single path component
//! ├── InvalidHomePath   — a manifest path does not stay below the home directory
//! ├── Manifest          — a flavor manifest could not be loaded or parsed
//! ├── Backup            — the backup directory could not be created
//! ├── ProtectedPath     — a removal would take the home or config directory with it
//! └── Platform          — the host cannot run the provisioning sequence
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Exit code used when the user declined at a prompt.
pub const EXIT_DECLINED: i32 = 3;

/// Exit code used when the run was interrupted by a signal.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Generic failure exit code.
pub const EXIT_FAILURE: i32 = 1;

/// Top-level error type for the provisioning engine.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A delegated command exited with a non-zero status.
    #[error("{command} failed (exit {}): {}", display_code(.code), .output.trim())]
    ExternalCommand {
        /// The full command line that was run.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Last lines of combined stdout/stderr.
        output: String,
    },

    /// A planned copy's source path does not exist.
    #[error("source not found: {}", .0.display())]
    MissingSource(PathBuf),

    /// A prompt was answered negatively where consent was required.
    #[error("declined: {0}")]
    UserDeclined(String),

    /// A configuration name is not a single, plain path component.
    #[error("invalid config name '{0}': must be a single directory name")]
    InvalidConfigName(String),

    /// A manifest path does not name something below the home directory.
    #[error("invalid path '{0}': must be a relative path below the home directory")]
    InvalidHomePath(String),

    /// The flavor manifest could not be loaded.
    #[error("manifest error in {source_name}: {message}")]
    Manifest {
        /// Manifest file path or built-in flavor name.
        source_name: String,
        /// Human-readable reason.
        message: String,
    },

    /// The backup directory could not be created.
    #[error("cannot create backup directory {}: {source}", .path.display())]
    Backup {
        /// Backup directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Removing this directory would also remove the home or configuration directory.
    #[error("refusing to remove {}: it contains the home or configuration directory", .0.display())]
    ProtectedPath(PathBuf),

    /// The current host cannot run the provisioning sequence.
    #[error("unsupported platform: {0}")]
    Platform(String),
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}

impl SetupError {
    /// Process exit code for this error.
    ///
    /// External command failures propagate the command's own status when it
    /// fits in a process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalCommand { code, .. } => match code {
                Some(c) if (1..=255).contains(c) && *c != EXIT_DECLINED => *c,
                _ => EXIT_FAILURE,
            },
            Self::UserDeclined(_) => EXIT_DECLINED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Map an [`anyhow::Error`] to a process exit code.
///
/// Walks the error chain looking for a [`SetupError`]; anything else maps to
/// [`EXIT_FAILURE`].
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|e| e.downcast_ref::<SetupError>())
        .map_or(EXIT_FAILURE, SetupError::exit_code)
}

/// Return `true` if the error chain contains a [`SetupError::UserDeclined`].
#[must_use]
pub fn is_declined(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|e| matches!(e.downcast_ref::<SetupError>(), Some(SetupError::UserDeclined(_))))
}
