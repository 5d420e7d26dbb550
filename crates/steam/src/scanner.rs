use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::DateTime;
use gamedeck_model::{Game, GameDetails, LaunchCommand, Platform, icon};
use gamedeck_registry::{Registry, uninstall_entry};

use crate::SteamError;
use crate::library::{AppManifest, library_folders, load_manifests};
use crate::paths::Paths;

/// Title substrings that mark tools and runtimes rather than games.
const DENYLIST: &[&str] = &[
    "steamworks common redistributables",
    "proton",
    "steam linux runtime",
    "steamvr",
    "directx",
    "redistributable",
];

/// Scans local Steam libraries for installed games.
#[derive(Clone)]
pub struct SteamScanner {
    root_override: Option<PathBuf>,
    registry: Arc<dyn Registry>,
}

impl SteamScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            root_override: None,
            registry,
        }
    }

    /// Uses `root` instead of auto-detecting the Steam installation.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_override = Some(root.into());
        self
    }

    /// Performs a full scan. Missing Steam yields an empty list.
    pub fn scan(&self) -> Result<Vec<Game>, SteamError> {
        let paths = match Paths::locate(self.root_override.as_deref(), self.registry.as_ref()) {
            Ok(paths) => paths,
            Err(SteamError::NotFound) => {
                tracing::debug!("Steam installation not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut games = Vec::new();
        let mut seen = HashSet::new();
        for steamapps in library_folders(&paths) {
            for manifest in load_manifests(&steamapps) {
                if seen.contains(&manifest.app_id) {
                    tracing::debug!(
                        app_id = manifest.app_id,
                        library = %steamapps.display(),
                        "skipping app already found in an earlier library"
                    );
                    continue;
                }
                if !manifest.is_installed() {
                    tracing::debug!(app_id = manifest.app_id, "skipping app not fully installed");
                    continue;
                }
                if is_denylisted(&manifest.name) {
                    tracing::debug!(app_id = manifest.app_id, name = %manifest.name, "skipping non-game app");
                    continue;
                }
                match self.normalize(&manifest) {
                    Ok(game) => {
                        seen.insert(manifest.app_id);
                        games.push(game);
                    }
                    Err(e) => tracing::debug!(app_id = manifest.app_id, error = %e, "skipping app"),
                }
            }
        }

        tracing::debug!(base = %paths.base_dir().display(), count = games.len(), "Steam scan finished");
        Ok(games)
    }

    fn normalize(&self, manifest: &AppManifest) -> Result<Game, SteamError> {
        let app_id = manifest.app_id;
        let launch = LaunchCommand::uri(format!("steam://rungameid/{app_id}"))?;
        let uninstall = LaunchCommand::uri(format!("steam://uninstall/{app_id}"))?;

        let details = GameDetails {
            last_activity: manifest
                .last_played
                .and_then(|t| DateTime::from_timestamp(t, 0)),
            ..Default::default()
        };

        Ok(Game::new(
            Platform::Steam.game_id(&app_id.to_string()),
            manifest.name.clone(),
            Platform::Steam.label(),
            launch,
        )
        .with_icon(self.find_icon(manifest))
        .with_uninstall(Some(uninstall))
        .with_details(details))
    }

    /// Uninstall-registry `DisplayIcon` first, then an executable that
    /// shares a word with the title.
    fn find_icon(&self, manifest: &AppManifest) -> Option<String> {
        let key = format!("Steam App {}", manifest.app_id);
        if let Some(entry) = uninstall_entry(self.registry.as_ref(), &key)
            && let Some(found) = icon::resolve_str(entry.display_icon.as_deref())
        {
            return Some(found);
        }

        let dir = manifest.install_path()?;
        find_titled_executable(&dir, &manifest.name).map(|p| p.to_string_lossy().into_owned())
    }
}

fn is_denylisted(name: &str) -> bool {
    let name = name.to_lowercase();
    DENYLIST.iter().any(|d| name.contains(d))
}

/// Lower-cased alphanumeric words of at least three characters.
fn tokens(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

/// Finds an `.exe` (up to one directory deep) whose stem shares a token
/// with `title`.
fn find_titled_executable(dir: &Path, title: &str) -> Option<PathBuf> {
    let title_tokens = tokens(title);
    if title_tokens.is_empty() {
        return None;
    }

    walkdir::WalkDir::new(dir)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .find(|path| {
            let is_exe = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("exe"));
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            is_exe && title_tokens.iter().any(|t| stem.contains(t.as_str()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedeck_registry::{Hive, MemoryRegistry};
    use std::fs;

    fn write_manifest(steamapps: &Path, app_id: u32, name: &str, flags: u32) {
        let text = format!(
            "\"AppState\"\n{{\n\t\"appid\" \"{app_id}\"\n\t\"name\" \"{name}\"\n\t\"StateFlags\" \"{flags}\"\n\t\"installdir\" \"{name}\"\n}}\n"
        );
        fs::write(steamapps.join(format!("appmanifest_{app_id}.acf")), text).unwrap();
    }

    fn steam_root() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let steamapps = tmp.path().join("steamapps");
        fs::create_dir_all(steamapps.join("common")).unwrap();
        (tmp, steamapps)
    }

    #[test]
    fn scan_filters_uninstalled_and_denylisted() {
        let (tmp, steamapps) = steam_root();
        write_manifest(&steamapps, 620, "Portal 2", 4);
        write_manifest(&steamapps, 730, "Counter-Strike 2", 1026);
        write_manifest(&steamapps, 999, "Half Downloaded", 3);
        write_manifest(&steamapps, 228980, "Steamworks Common Redistributables", 4);
        write_manifest(&steamapps, 1493710, "Proton Experimental", 4);

        let scanner = SteamScanner::new(Arc::new(MemoryRegistry::new())).with_root(tmp.path());
        let games = scanner.scan().unwrap();

        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["steam-620", "steam-730"]);
        assert_eq!(
            games[0].launch_command,
            LaunchCommand::uri("steam://rungameid/620").unwrap()
        );
        assert_eq!(
            games[0].uninstall_command,
            Some(LaunchCommand::uri("steam://uninstall/620").unwrap())
        );
        assert_eq!(games[0].platform, "Steam");
    }

    #[test]
    fn app_in_two_libraries_is_listed_once() {
        let (tmp, steamapps) = steam_root();
        let second = tmp.path().join("Lib2");
        fs::create_dir_all(second.join("steamapps")).unwrap();
        fs::write(
            steamapps.join("libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n\t\"1\"\n\t{{\n\t\t\"path\" \"{}\"\n\t}}\n}}\n",
                second.display()
            ),
        )
        .unwrap();
        write_manifest(&steamapps, 620, "Portal 2", 4);
        write_manifest(&second.join("steamapps"), 620, "Portal 2 (stale)", 4);
        write_manifest(&second.join("steamapps"), 400, "Portal", 4);

        let games = SteamScanner::new(Arc::new(MemoryRegistry::new()))
            .with_root(tmp.path())
            .scan()
            .unwrap();
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["steam-620", "steam-400"]);
        assert_eq!(games[0].title, "Portal 2");
    }

    #[test]
    fn icon_from_uninstall_registry() {
        let (tmp, steamapps) = steam_root();
        write_manifest(&steamapps, 620, "Portal 2", 4);
        let icon_file = tmp.path().join("portal2.ico");
        fs::write(&icon_file, b"ico").unwrap();

        let reg = MemoryRegistry::new()
            .with_value(
                Hive::LocalMachine,
                r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Steam App 620",
                "DisplayName",
                "Portal 2",
            )
            .with_value(
                Hive::LocalMachine,
                r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Steam App 620",
                "DisplayIcon",
                &icon_file.to_string_lossy(),
            );

        let games = SteamScanner::new(Arc::new(reg)).with_root(tmp.path()).scan().unwrap();
        assert_eq!(games[0].icon_path, Some(icon_file.to_string_lossy().into_owned()));
    }

    #[test]
    fn icon_falls_back_to_titled_executable() {
        let (tmp, steamapps) = steam_root();
        write_manifest(&steamapps, 620, "Portal 2", 4);
        let game_dir = steamapps.join("common").join("Portal 2");
        fs::create_dir_all(game_dir.join("bin")).unwrap();
        fs::write(game_dir.join("bin").join("crashhandler.exe"), b"MZ").unwrap();
        fs::write(game_dir.join("portal2.exe"), b"MZ").unwrap();

        let games = SteamScanner::new(Arc::new(MemoryRegistry::new()))
            .with_root(tmp.path())
            .scan()
            .unwrap();
        assert_eq!(
            games[0].icon_path,
            Some(game_dir.join("portal2.exe").to_string_lossy().into_owned())
        );
    }

    #[test]
    fn no_icon_is_not_an_error() {
        let (tmp, steamapps) = steam_root();
        write_manifest(&steamapps, 70, "Half-Life", 4);
        let games = SteamScanner::new(Arc::new(MemoryRegistry::new()))
            .with_root(tmp.path())
            .scan()
            .unwrap();
        assert_eq!(games.len(), 1);
        assert!(games[0].icon_path.is_none());
    }

    #[test]
    fn tokens_ignore_short_words() {
        assert_eq!(tokens("Portal 2: The Game"), ["portal", "the", "game"]);
    }

    #[test]
    fn denylist_is_case_insensitive() {
        assert!(is_denylisted("SteamVR"));
        assert!(is_denylisted("Steam Linux Runtime - Sniper"));
        assert!(!is_denylisted("Portal 2"));
    }
}
