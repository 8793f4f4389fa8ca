//! Command-line interface definition.
use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_FLAVOR, ManifestSource};
use crate::orchestrator::SkippableStep;

/// Version string: `HYPRSETUP_VERSION` from the build, else the crate version.
pub const VERSION: &str = match option_env!("HYPRSETUP_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point for the Hyprland provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "hyprsetup",
    about = "Provision a Hyprland desktop on Arch Linux",
    version = VERSION
)]
pub struct Cli {
    /// Answer yes to every question
    #[arg(short, long)]
    pub yes: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Built-in flavor to install (see --list-flavors)
    #[arg(short, long, conflicts_with = "manifest")]
    pub flavor: Option<String>,

    /// Use a flavor manifest file instead of a built-in flavor
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Override the configuration repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Install into this home directory instead of $HOME
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Skip package steps
    #[arg(long, value_delimiter = ',', value_enum)]
    pub skip: Vec<SkippableStep>,

    /// List built-in flavors and exit
    #[arg(long)]
    pub list_flavors: bool,
}

impl Cli {
    /// Where the flavor manifest comes from.
    #[must_use]
    pub fn manifest_source(&self) -> ManifestSource {
        match (&self.manifest, &self.flavor) {
            (Some(path), _) => ManifestSource::File(path.clone()),
            (None, Some(name)) => ManifestSource::Builtin(name.clone()),
            (None, None) => ManifestSource::Builtin(DEFAULT_FLAVOR.to_string()),
        }
    }
}
