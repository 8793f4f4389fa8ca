//! Validated configuration unit names.
use std::fmt;

use serde::Deserialize;

use crate::error::SetupError;

/// Name of a configuration unit: a directory directly under the config root
/// (`hypr`, `waybar`, `kitty`, ...).
///
/// Always a single plain path component, so joining it onto a root can never
/// escape that root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ConfigName(String);

impl ConfigName {
    /// Validate and wrap `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidConfigName`] if `name` is empty, `.`,
    /// `..`, or contains a path separator or NUL byte.
    pub fn new(name: impl Into<String>) -> Result<Self, SetupError> {
        let name = name.into();
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0']);
        if invalid {
            return Err(SetupError::InvalidConfigName(name));
        }
        Ok(Self(name))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConfigName {
    type Error = SetupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<std::path::Path> for ConfigName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
