//! Flavor manifests: built-in variants embedded at compile time plus custom
//! files loaded from disk.
pub mod config_name;
pub mod home_path;
pub mod manifest;
pub mod toml_loader;
pub mod validation;

use anyhow::Result;
use std::path::PathBuf;

pub use config_name::ConfigName;
pub use home_path::HomePath;
pub use manifest::{AurHelper, Manifest};

use crate::error::SetupError;

/// Built-in flavors, in display order.
const BUILTIN_FLAVORS: &[(&str, &str)] = &[
    (
        "standard",
        include_str!("../../conf/flavors/standard.toml"),
    ),
    ("minimal", include_str!("../../conf/flavors/minimal.toml")),
    ("full", include_str!("../../conf/flavors/full.toml")),
];

/// Name of the flavor used when none is requested.
pub const DEFAULT_FLAVOR: &str = "standard";

/// Where a manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// One of the embedded flavors, by name.
    Builtin(String),
    /// A TOML file on disk.
    File(PathBuf),
}

impl ManifestSource {
    /// Load and parse the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Manifest`] for an unknown flavor or an invalid
    /// manifest, or an I/O error if a manifest file cannot be read.
    pub fn load(&self) -> Result<Manifest> {
        match self {
            Self::Builtin(name) => {
                let text = BUILTIN_FLAVORS
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, text)| *text)
                    .ok_or_else(|| SetupError::Manifest {
                        source_name: name.clone(),
                        message: format!(
                            "unknown flavor (available: {})",
                            flavor_names().join(", ")
                        ),
                    })?;
                toml_loader::parse_manifest(text, name)
            }
            Self::File(path) => toml_loader::load_manifest(path),
        }
    }
}

/// Names of the built-in flavors.
#[must_use]
pub fn flavor_names() -> Vec<&'static str> {
    BUILTIN_FLAVORS.iter().map(|(name, _)| *name).collect()
}

/// Parse every built-in flavor.
///
/// # Errors
///
/// Returns an error if an embedded manifest does not parse.
pub fn builtin_manifests() -> Result<Vec<Manifest>> {
    BUILTIN_FLAVORS
        .iter()
        .map(|(name, text)| toml_loader::parse_manifest(text, name))
        .collect()
}
