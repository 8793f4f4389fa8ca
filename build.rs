//! Build script: embeds the release version into the binary.

use std::process::Command;

fn main() {
    // Prefer HYPRSETUP_VERSION from the environment (release builds), otherwise
    // fall back to git describe for local development builds.
    if let Ok(version) = std::env::var("HYPRSETUP_VERSION") {
        println!("cargo:rustc-env=HYPRSETUP_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=HYPRSETUP_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=HYPRSETUP_VERSION");
}
