//! Library folders and app manifests.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::SteamError;
use crate::paths::{Paths, steamapps_dir_in};
use crate::vdf::{Vdf, VdfObject, load_vdf, parse_vdf};

/// `StateFlags` bit set once an app is fully installed.
pub const STATE_FULLY_INSTALLED: u32 = 4;

/// Returns every `steamapps` directory registered with Steam.
///
/// The root's own `steamapps` always comes first. A missing or corrupt
/// `libraryfolders.vdf` just yields the root library.
pub fn library_folders(paths: &Paths) -> Vec<PathBuf> {
    let mut folders = vec![paths.steamapps_dir()];

    match load_vdf(&paths.library_folders_path()) {
        Ok(root) => {
            for library in library_roots(&root) {
                folders.push(steamapps_dir_in(&library));
            }
        }
        Err(e) => tracing::debug!(error = %e, "no usable libraryfolders.vdf"),
    }

    let mut seen = HashSet::new();
    folders.retain(|f| seen.insert(normalize(f)));
    folders
}

/// Extracts library roots from a parsed `libraryfolders.vdf`.
///
/// Handles both the nested `"0" { "path" "..." }` layout and the legacy
/// `"1" "D:\\Lib"` layout.
fn library_roots(root: &VdfObject) -> Vec<PathBuf> {
    let Some(folders) = root
        .get_obj("libraryfolders")
        .or_else(|| root.get_obj("LibraryFolders"))
    else {
        return Vec::new();
    };

    folders
        .iter()
        .filter(|(key, _)| key.parse::<u32>().is_ok())
        .filter_map(|(_, value)| match value {
            Vdf::Obj(entry) => entry.get_str("path").map(PathBuf::from),
            Vdf::Str(path) => Some(PathBuf::from(path)),
        })
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy()
        .trim_end_matches(['/', '\\'])
        .replace('\\', "/")
        .to_lowercase()
}

/// Per-title state parsed from `appmanifest_<appid>.acf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppManifest {
    pub app_id: u32,
    pub name: String,
    pub install_dir: String,
    pub state_flags: u32,
    /// Unix seconds, when Steam recorded one.
    pub last_played: Option<i64>,
    /// The `steamapps` directory the manifest was read from.
    pub library: PathBuf,
}

impl AppManifest {
    /// Parses the text of an app manifest.
    pub fn parse(text: &str, library: &Path) -> Result<Self, SteamError> {
        let root = parse_vdf(text)?;
        let state = root
            .get_obj("AppState")
            .ok_or_else(|| SteamError::Manifest("missing AppState".into()))?;

        let app_id = state
            .get_str("appid")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .ok_or_else(|| SteamError::Manifest("missing or invalid appid".into()))?;

        let name = state
            .get_str("name")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SteamError::Manifest(format!("app {app_id} has no name")))?
            .to_string();

        let state_flags = state
            .get_str("StateFlags")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);

        let last_played = state
            .get_str("LastPlayed")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|t| *t > 0);

        Ok(Self {
            app_id,
            name,
            install_dir: state.get_str("installdir").unwrap_or_default().to_string(),
            state_flags,
            last_played,
            library: library.to_path_buf(),
        })
    }

    pub fn is_installed(&self) -> bool {
        self.state_flags & STATE_FULLY_INSTALLED != 0
    }

    /// Returns `steamapps/common/<installdir>`.
    pub fn install_path(&self) -> Option<PathBuf> {
        if self.install_dir.is_empty() {
            return None;
        }
        Some(self.library.join("common").join(&self.install_dir))
    }
}

/// Loads every parseable app manifest in a `steamapps` directory.
///
/// Unreadable or malformed manifests are skipped.
pub fn load_manifests(steamapps: &Path) -> Vec<AppManifest> {
    let Ok(entries) = fs::read_dir(steamapps) else {
        tracing::debug!(path = %steamapps.display(), "library folder not readable");
        return Vec::new();
    };

    let mut manifests = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_manifest = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("appmanifest_") && n.ends_with(".acf"));
        if !is_manifest {
            continue;
        }

        let parsed = fs::read_to_string(&path)
            .map_err(|e| SteamError::Io(e.to_string()))
            .and_then(|text| AppManifest::parse(&text, steamapps));

        match parsed {
            Ok(m) => manifests.push(m),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping app manifest"),
        }
    }

    manifests.sort_by_key(|m| m.app_id);
    manifests
}
