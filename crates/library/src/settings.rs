//! User settings: which platforms to scan and how to order the result.

use std::path::PathBuf;

use gamedeck_model::{Platform, SortOrder};
use gamedeck_stores::ShortcutFolder;
use serde::{Deserialize, Serialize};

/// Shortcut folders beyond this many are ignored.
pub const MAX_SHORTCUT_FOLDERS: usize = 5;

fn default_true() -> bool {
    true
}

/// One configured shortcut directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutFolderSetting {
    #[serde(default)]
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub steam: bool,
    #[serde(default = "default_true")]
    pub epic: bool,
    #[serde(default = "default_true")]
    pub gog: bool,
    #[serde(default = "default_true")]
    pub ea: bool,
    #[serde(default = "default_true")]
    pub ubisoft: bool,
    #[serde(default = "default_true")]
    pub xbox: bool,
    #[serde(default = "default_true")]
    pub playnite: bool,
    #[serde(default)]
    pub sort_order: SortOrder,
    /// Explicit Steam root; skips auto-detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_root: Option<PathBuf>,
    /// Explicit Playnite data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playnite_data_dir: Option<PathBuf>,
    /// Azure application id used by the Xbox authorization flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xbox_client_id: Option<String>,
    /// Must stay the last field: it serializes as a TOML array of tables.
    #[serde(default)]
    pub shortcut_folders: Vec<ShortcutFolderSetting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            steam: true,
            epic: true,
            gog: true,
            ea: true,
            ubisoft: true,
            xbox: true,
            playnite: true,
            sort_order: SortOrder::default(),
            steam_root: None,
            playnite_data_dir: None,
            xbox_client_id: None,
            shortcut_folders: Vec::new(),
        }
    }
}

impl Settings {
    /// Whether `platform` is switched on. Shortcuts count as enabled when
    /// at least one folder is.
    pub fn is_enabled(&self, platform: Platform) -> bool {
        match platform {
            Platform::Steam => self.steam,
            Platform::Epic => self.epic,
            Platform::Gog => self.gog,
            Platform::Ea => self.ea,
            Platform::Ubisoft => self.ubisoft,
            Platform::Xbox => self.xbox,
            Platform::Playnite => self.playnite,
            Platform::Shortcuts => self.active_folders().next().is_some(),
        }
    }

    /// Enabled shortcut folders, capped at [`MAX_SHORTCUT_FOLDERS`].
    pub fn shortcut_folders(&self) -> Vec<ShortcutFolder> {
        if self.shortcut_folders.len() > MAX_SHORTCUT_FOLDERS {
            tracing::warn!(
                configured = self.shortcut_folders.len(),
                max = MAX_SHORTCUT_FOLDERS,
                "ignoring extra shortcut folders"
            );
        }
        self.active_folders()
            .map(|f| ShortcutFolder::new(f.name.clone(), f.path.clone()))
            .collect()
    }

    fn active_folders(&self) -> impl Iterator<Item = &ShortcutFolderSetting> {
        self.shortcut_folders
            .iter()
            .take(MAX_SHORTCUT_FOLDERS)
            .filter(|f| f.enabled && !f.path.as_os_str().is_empty())
    }
}
