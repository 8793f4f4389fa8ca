//! Manifest checks that warn instead of failing the load.
use std::collections::HashSet;
use std::path::Path;

use super::config_name::ConfigName;
use super::manifest::{AssetSpec, Manifest, PackageSpec, SourceSpec};
use crate::platform::Platform;

/// Manifest section names used as the warning source.
const PACKAGES: &str = "[packages]";
const SERVICES: &str = "[services]";
const SOURCE: &str = "[source]";
const ASSETS: &str = "[assets]";
const BACKUP: &str = "[backup]";

/// A validation warning detected while checking a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The manifest section (e.g., "[packages]", "[assets]").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item` in manifest section `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.source, self.item, self.message)
    }
}

/// Trait for manifest section validators.
pub trait ConfigValidator {
    /// Validate the section and return any warnings found.
    fn validate(&self, platform: &Platform) -> Vec<ValidationWarning>;
}

/// Validator for the package lists.
#[derive(Debug)]
pub struct PackageValidator<'a> {
    packages: &'a PackageSpec,
}

impl<'a> PackageValidator<'a> {
    /// Validate `packages`.
    #[must_use]
    pub const fn new(packages: &'a PackageSpec) -> Self {
        Self { packages }
    }
}

impl ConfigValidator for PackageValidator<'_> {
    fn validate(&self, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        let all = self
            .packages
            .tools
            .iter()
            .chain(&self.packages.desktop)
            .chain(&self.packages.aur);
        for name in all {
            if name.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    PACKAGES,
                    name,
                    "package name is empty",
                ));
                continue;
            }
            if !seen.insert(name.as_str()) {
                warnings.push(ValidationWarning::new(
                    PACKAGES,
                    name,
                    "package listed more than once",
                ));
            }
        }

        if !self.packages.aur.is_empty() && !platform.is_arch {
            warnings.push(ValidationWarning::new(
                PACKAGES,
                "aur",
                "AUR packages specified but platform is not Arch Linux",
            ));
        }

        warnings
    }
}

/// Validator for the service list.
#[derive(Debug)]
pub struct ServiceValidator<'a> {
    units: &'a [String],
}

impl<'a> ServiceValidator<'a> {
    /// Validate `units`.
    #[must_use]
    pub const fn new(units: &'a [String]) -> Self {
        Self { units }
    }
}

impl ConfigValidator for ServiceValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        self.units
            .iter()
            .filter(|unit| unit.trim().is_empty())
            .map(|unit| ValidationWarning::new(SERVICES, unit, "service name is empty"))
            .collect()
    }
}

/// Validator for the backed-up configuration names.
#[derive(Debug)]
pub struct BackupValidator<'a> {
    configs: &'a [ConfigName],
}

impl<'a> BackupValidator<'a> {
    /// Validate `configs`.
    #[must_use]
    pub const fn new(configs: &'a [ConfigName]) -> Self {
        Self { configs }
    }
}

impl ConfigValidator for BackupValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut seen = HashSet::new();
        self.configs
            .iter()
            .filter(|name| !seen.insert(*name))
            .map(|name| {
                ValidationWarning::new(BACKUP, name.as_str(), "config listed more than once")
            })
            .collect()
    }
}

/// Validator for the repository source.
#[derive(Debug)]
pub struct SourceValidator<'a> {
    source: &'a SourceSpec,
}

impl<'a> SourceValidator<'a> {
    /// Validate `source`.
    #[must_use]
    pub const fn new(source: &'a SourceSpec) -> Self {
        Self { source }
    }
}

impl ConfigValidator for SourceValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if self.source.url.trim().is_empty() {
            warnings.push(ValidationWarning::new(SOURCE, "url", "clone URL is empty"));
        }
        warnings
    }
}

/// Validator for asset directories and the fallback wallpaper.
#[derive(Debug)]
pub struct AssetValidator<'a> {
    assets: &'a AssetSpec,
}

impl<'a> AssetValidator<'a> {
    /// Validate `assets`.
    #[must_use]
    pub const fn new(assets: &'a AssetSpec) -> Self {
        Self { assets }
    }
}

impl ConfigValidator for AssetValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let dirs: [(&str, &Path); 3] = [
            ("wallpapers", &self.assets.wallpapers),
            ("screenshots", &self.assets.screenshots),
            ("local_bin", &self.assets.local_bin),
        ];
        for (key, dir) in dirs {
            if dir.is_absolute() {
                warnings.push(ValidationWarning::new(
                    ASSETS,
                    key,
                    format!(
                        "{} should be relative to the home directory",
                        dir.display()
                    ),
                ));
            }
        }

        if let Some(url) = &self.assets.fallback_wallpaper_url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            warnings.push(ValidationWarning::new(
                ASSETS,
                "fallback_wallpaper_url",
                format!("'{url}' is not an HTTP(S) URL"),
            ));
        }

        warnings
    }
}

/// Run all validators over `manifest`.
#[must_use]
pub fn validate_all(manifest: &Manifest, platform: &Platform) -> Vec<ValidationWarning> {
    let validators: [&dyn ConfigValidator; 5] = [
        &SourceValidator::new(&manifest.source),
        &PackageValidator::new(&manifest.packages),
        &ServiceValidator::new(&manifest.services.enable),
        &BackupValidator::new(&manifest.backup.configs),
        &AssetValidator::new(&manifest.assets),
    ];
    validators
        .iter()
        .flat_map(|v| v.validate(platform))
        .collect()
}
