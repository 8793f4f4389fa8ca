//! Host detection.
use std::path::Path;

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Running on Arch Linux or a derivative (pacman-based).
    pub is_arch: bool,
    /// Running with an effective user id of 0.
    pub is_root: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            is_arch: Self::detect_arch(),
            is_root: Self::detect_root(),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub const fn new(is_arch: bool, is_root: bool) -> Self {
        Self { is_arch, is_root }
    }

    fn detect_arch() -> bool {
        cfg!(target_os = "linux")
            && (Path::new("/etc/arch-release").exists() || which::which("pacman").is_ok())
    }

    /// Read the effective uid from `/proc/self/status`.
    fn detect_root() -> bool {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .as_deref()
            .and_then(effective_uid)
            .is_some_and(|uid| uid == 0)
    }
}

/// Parse the effective uid (second field of the `Uid:` line) from a
/// `/proc/<pid>/status` document.
fn effective_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().nth(1))
        .and_then(|uid| uid.parse().ok())
}
