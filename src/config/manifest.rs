//! Declarative flavor manifest.
//!
//! A flavor describes one provisioning variant: which packages to install,
//! which services to enable, where the configuration repository lives, which
//! configuration directories are worth backing up, and where default assets
//! go.  All paths are relative to the user's home directory.
use std::path::PathBuf;

use serde::Deserialize;

use super::config_name::ConfigName;
use super::home_path::HomePath;

/// A complete flavor manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Flavor identification.
    pub flavor: FlavorInfo,
    /// Configuration repository.
    pub source: SourceSpec,
    /// Packages to install.
    #[serde(default)]
    pub packages: PackageSpec,
    /// Services to enable.
    #[serde(default)]
    pub services: ServiceSpec,
    /// Configuration directories to snapshot and install.
    #[serde(default)]
    pub backup: BackupSpec,
    /// Asset directories.
    #[serde(default)]
    pub assets: AssetSpec,
}

/// Identification of the flavor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlavorInfo {
    /// Flavor name, as passed to `--flavor`.
    pub name: String,
    /// One-line description for `--list-flavors`.
    #[serde(default)]
    pub description: String,
}

/// Where the configuration repository comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// Clone URL.
    pub url: String,
    /// Clone destination, strictly below `$HOME`.
    #[serde(default = "default_clone_dir")]
    pub clone_dir: HomePath,
}

/// Packages installed by the tool and desktop steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSpec {
    /// Base tooling installed before the desktop (git, base-devel, ...).
    #[serde(default)]
    pub tools: Vec<String>,
    /// Official repository packages for the desktop itself.
    #[serde(default)]
    pub desktop: Vec<String>,
    /// AUR packages installed through the helper.
    #[serde(default)]
    pub aur: Vec<String>,
    /// Which AUR helper to bootstrap and use.
    #[serde(default)]
    pub aur_helper: AurHelper,
}

/// Supported AUR helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AurHelper {
    /// `yay`.
    #[default]
    Yay,
    /// `paru`.
    Paru,
}

impl AurHelper {
    /// Executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Yay => "yay",
            Self::Paru => "paru",
        }
    }

    /// AUR clone URL of the prebuilt helper package.
    #[must_use]
    pub fn bootstrap_url(self) -> String {
        format!("https://aur.archlinux.org/{}-bin.git", self.program())
    }
}

impl std::fmt::Display for AurHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// System services enabled after the desktop packages are installed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSpec {
    /// systemd units to enable.
    #[serde(default)]
    pub enable: Vec<String>,
}

/// Configuration directories snapshotted before installation.
///
/// The declared order is also the order in which they are installed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupSpec {
    /// Directory names under the configuration root.
    #[serde(default)]
    pub configs: Vec<ConfigName>,
}

/// Default asset directories, relative to `$HOME`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    /// Wallpaper directory.
    #[serde(default = "default_wallpapers")]
    pub wallpapers: PathBuf,
    /// Screenshot directory.
    #[serde(default = "default_screenshots")]
    pub screenshots: PathBuf,
    /// User executables directory.
    #[serde(default = "default_local_bin")]
    pub local_bin: PathBuf,
    /// Top-level repository directories holding wallpapers; their contents are
    /// merged into `wallpapers` instead of the config root.
    #[serde(default = "default_repo_wallpaper_dirs")]
    pub repo_wallpaper_dirs: Vec<String>,
    /// Downloaded when the wallpaper directory is still empty at the end.
    #[serde(default)]
    pub fallback_wallpaper_url: Option<String>,
}

impl Default for AssetSpec {
    fn default() -> Self {
        Self {
            wallpapers: default_wallpapers(),
            screenshots: default_screenshots(),
            local_bin: default_local_bin(),
            repo_wallpaper_dirs: default_repo_wallpaper_dirs(),
            fallback_wallpaper_url: None,
        }
    }
}

fn default_clone_dir() -> HomePath {
    HomePath(PathBuf::from(".cache/hyprsetup/rice"))
}

fn default_wallpapers() -> PathBuf {
    PathBuf::from("Pictures/Wallpapers")
}

fn default_screenshots() -> PathBuf {
    PathBuf::from("Pictures/Screenshots")
}

fn default_local_bin() -> PathBuf {
    PathBuf::from(".local/bin")
}

fn default_repo_wallpaper_dirs() -> Vec<String> {
    vec!["wallpapers".to_string(), "Wallpapers".to_string()]
}

impl Manifest {
    /// Parse a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or does not match the
    /// manifest schema.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[flavor]
name = "test"

[source]
url = "https://example.com/rice.git"
"#;

    #[test]
    fn minimal_manifest_uses_defaults() {
        let m = Manifest::from_toml(MINIMAL).unwrap();
        assert_eq!(m.flavor.name, "test");
        assert_eq!(
            m.source.clone_dir.as_path(),
            std::path::Path::new(".cache/hyprsetup/rice")
        );
        assert_eq!(m.packages.aur_helper, AurHelper::Yay);
        assert!(m.backup.configs.is_empty());
        assert_eq!(m.assets.wallpapers, PathBuf::from("Pictures/Wallpapers"));
        assert_eq!(m.assets.local_bin, PathBuf::from(".local/bin"));
        assert!(m.assets.fallback_wallpaper_url.is_none());
    }

    #[test]
    fn full_manifest_parses() {
        let text = r#"
[flavor]
name = "custom"
description = "custom flavor"

[source]
url = "https://example.com/rice.git"
clone_dir = "src/rice"

[packages]
tools = ["git", "base-devel"]
desktop = ["hyprland", "waybar"]
aur = ["wlogout"]
aur_helper = "paru"

[services]
enable = ["sddm.service"]

[backup]
configs = ["waybar", "hypr", "hypr"]

[assets]
wallpapers = "Pictures/wallpapers"
fallback_wallpaper_url = "https://example.com/wall.png"
"#;
        let m = Manifest::from_toml(text).unwrap();
        assert_eq!(m.packages.aur_helper, AurHelper::Paru);
        assert_eq!(m.services.enable, vec!["sddm.service"]);
        let names: Vec<&str> = m.backup.configs.iter().map(ConfigName::as_str).collect();
        assert_eq!(names, vec!["waybar", "hypr", "hypr"], "declared order is kept");
        assert_eq!(m.source.clone_dir.as_path(), std::path::Path::new("src/rice"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\n[packages]\nsystem = [\"git\"]\n");
        assert!(Manifest::from_toml(&text).is_err());
    }

    #[test]
    fn invalid_backup_name_is_rejected() {
        let text = format!("{MINIMAL}\n[backup]\nconfigs = [\"../.ssh\"]\n");
        assert!(Manifest::from_toml(&text).is_err());
    }

    #[test]
    fn clone_dir_outside_home_is_rejected() {
        for dir in ["", ".", "..", "/", "/opt/rice", "../rice"] {
            let text = MINIMAL.replace(
                "url = \"https://example.com/rice.git\"",
                &format!("url = \"https://example.com/rice.git\"\nclone_dir = \"{dir}\""),
            );
            assert!(
                Manifest::from_toml(&text).is_err(),
                "clone_dir '{dir}' should be rejected"
            );
        }
    }

    #[test]
    fn aur_helper_bootstrap_url() {
        assert_eq!(
            AurHelper::Paru.bootstrap_url(),
            "https://aur.archlinux.org/paru-bin.git"
        );
        assert_eq!(AurHelper::Yay.to_string(), "yay");
    }
}
