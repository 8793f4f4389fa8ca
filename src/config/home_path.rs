//! Paths below the user's home directory.
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::SetupError;

/// A non-empty relative path made only of plain components.
///
/// Joined onto `$HOME` it always names something strictly inside the home
/// directory, never the home directory itself or anything above it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "PathBuf")]
pub struct HomePath(pub(super) PathBuf);

impl HomePath {
    /// Validate and wrap `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidHomePath`] unless `path` is a non-empty
    /// relative path of plain components.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SetupError> {
        let path = path.into();
        let mut components = path.components().peekable();
        let plain = components.peek().is_some()
            && components.all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(SetupError::InvalidHomePath(path.display().to_string()));
        }
        Ok(Self(path))
    }

    /// The relative path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl TryFrom<PathBuf> for HomePath {
    type Error = SetupError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<Path> for HomePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for HomePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
