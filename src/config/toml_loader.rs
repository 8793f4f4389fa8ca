//! TOML manifest loading.
use anyhow::{Context, Result};
use std::path::Path;

use super::manifest::Manifest;
use crate::error::SetupError;

/// Parse manifest text, attributing failures to `source_name`.
///
/// # Errors
///
/// Returns [`SetupError::Manifest`] if the text is not a valid manifest.
pub fn parse_manifest(text: &str, source_name: &str) -> Result<Manifest> {
    Manifest::from_toml(text).map_err(|e| {
        SetupError::Manifest {
            source_name: source_name.to_string(),
            message: e.message().to_string(),
        }
        .into()
    })
}

/// Load a manifest from a TOML file on disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    parse_manifest(&content, &path.display().to_string())
}
