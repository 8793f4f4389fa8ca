//! Translation of a [`SourceLayout`] into concrete copy operations.
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::InstallTargets;
use super::layout::{LayoutResolver, SourceLayout, VCS_DIRS};
use crate::config::{ConfigName, Manifest};

/// One configuration unit to merge into the configuration root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyEntry {
    /// Configuration unit name.
    pub name: ConfigName,
    /// Source path in the repository; may not exist.
    pub source: PathBuf,
    /// Destination under the configuration root.
    pub dest: PathBuf,
}

/// A repository asset directory merged outside the configuration root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMerge {
    /// Asset directory in the repository.
    pub source: PathBuf,
    /// Asset directory under the home directory.
    pub dest: PathBuf,
}

/// Everything the installer will do, in order.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    /// Detected repository layout.
    pub layout: SourceLayout,
    /// Root every [`CopyEntry::dest`] lives under.
    pub dest_root: PathBuf,
    /// Configuration units, declared names first.
    pub entries: Vec<CopyEntry>,
    /// Repository assets merged outside the configuration root.
    pub asset_merges: Vec<AssetMerge>,
    /// Directories that must exist afterwards.
    pub seed_dirs: Vec<PathBuf>,
    /// Installer script for [`SourceLayout::SelfInstalling`].
    pub script: Option<PathBuf>,
}

impl InstallPlan {
    /// Build the plan for `layout`.
    ///
    /// Entries start with the manifest's configuration names in declared
    /// order, followed by the remaining discovered units in sorted order.
    /// Version-control directories are never planned, even when declared.
    /// Repository wallpaper directories become asset merges; under
    /// [`SourceLayout::FlatTopLevel`] they are never copied as configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout's source directory cannot be listed.
    pub fn build(
        resolver: &LayoutResolver,
        layout: &SourceLayout,
        repo_root: &Path,
        targets: &InstallTargets,
        manifest: &Manifest,
    ) -> Result<Self> {
        let assets = &manifest.assets;
        let wallpaper_dir = targets.home.join(&assets.wallpapers);
        let seed_dirs = vec![
            wallpaper_dir.clone(),
            targets.home.join(&assets.screenshots),
            targets.home.join(&assets.local_bin),
        ];

        if let SourceLayout::SelfInstalling { script } = layout {
            return Ok(Self {
                layout: layout.clone(),
                dest_root: targets.config_root.clone(),
                entries: Vec::new(),
                asset_merges: Vec::new(),
                seed_dirs,
                script: Some(script.clone()),
            });
        }

        let mut excluded: HashSet<&str> = VCS_DIRS.iter().copied().collect();
        if *layout == SourceLayout::FlatTopLevel {
            excluded.extend(assets.repo_wallpaper_dirs.iter().map(String::as_str));
        }

        let mut entries = Vec::new();
        let mut seen: HashSet<ConfigName> = HashSet::new();
        if let Some(source_dir) = layout.source_dir(repo_root) {
            let declared = manifest
                .backup
                .configs
                .iter()
                .map(|name| (name.clone(), source_dir.join(name)));
            let discovered = resolver.discover(layout, repo_root)?;
            for (name, source) in declared.chain(discovered) {
                if excluded.contains(name.as_str()) || !seen.insert(name.clone()) {
                    continue;
                }
                entries.push(CopyEntry {
                    dest: targets.config_root.join(&name),
                    name,
                    source,
                });
            }
        }

        let asset_merges = assets
            .repo_wallpaper_dirs
            .iter()
            .map(|dir| repo_root.join(dir))
            .filter(|source| resolver.is_dir(source))
            .map(|source| AssetMerge {
                source,
                dest: wallpaper_dir.clone(),
            })
            .collect();

        Ok(Self {
            layout: layout.clone(),
            dest_root: targets.config_root.clone(),
            entries,
            asset_merges,
            seed_dirs,
            script: None,
        })
    }

    /// Names of the planned entries, in order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
