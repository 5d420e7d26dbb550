//! User-configured shortcut folders.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use gamedeck_model::{Game, LaunchCommand, Platform, icon};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Recognized shortcut extensions (compared case-insensitively).
pub const SHORTCUT_EXTENSIONS: &[&str] = &["url", "lnk"];

/// A named directory of shortcuts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutFolder {
    pub name: String,
    pub path: PathBuf,
}

impl ShortcutFolder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Configured name, or the directory name when blank.
    fn label(&self) -> String {
        let name = self.name.trim();
        let name = if name.is_empty() {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            name.to_string()
        };
        Platform::Shortcuts.sub_label(&name)
    }
}

/// Builds the id of a shortcut from its full path.
pub fn shortcut_id(path: &Path) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(path.to_string_lossy().as_bytes());
    Platform::Shortcuts.game_id(&encoded)
}

/// Reads the `IconFile=` entry of an internet shortcut, resolved relative
/// to the shortcut's folder.
pub fn url_icon_file(shortcut: &Path) -> Option<PathBuf> {
    let bytes = fs::read(shortcut).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let value = text.lines().find_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("IconFile")
            .then(|| value.trim().trim_matches('"').to_string())
    })?;
    if value.is_empty() {
        return None;
    }

    let path = PathBuf::from(&value);
    if path.is_absolute() {
        Some(path)
    } else {
        shortcut.parent().map(|dir| dir.join(value))
    }
}

fn shortcut_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SHORTCUT_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutScanner {
    folders: Vec<ShortcutFolder>,
}

impl ShortcutScanner {
    pub fn new(folders: Vec<ShortcutFolder>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[ShortcutFolder] {
        &self.folders
    }

    /// Walks every folder. A missing folder contributes nothing.
    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let mut seen = HashSet::new();
        let mut games = Vec::new();

        for folder in &self.folders {
            if !folder.path.is_dir() {
                tracing::debug!(path = %folder.path.display(), "shortcut folder missing");
                continue;
            }
            let label = folder.label();

            let files = walkdir::WalkDir::new(&folder.path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file());

            for entry in files {
                let path = entry.into_path();
                let Some(ext) = shortcut_extension(&path) else {
                    continue;
                };
                if !seen.insert(path.clone()) {
                    continue;
                }
                games.push(normalize(&path, &ext, &label)?);
            }
        }
        Ok(games)
    }
}

fn normalize(path: &Path, ext: &str, label: &str) -> Result<Game, StoreError> {
    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let icon = match ext {
        "url" => icon::resolve(url_icon_file(path).as_deref()),
        _ => icon::resolve(Some(path)),
    }
    .map(|p| p.to_string_lossy().into_owned());

    Ok(Game::new(
        shortcut_id(path),
        title,
        label,
        LaunchCommand::open_in_place(path)?,
    )
    .with_icon(icon)
    .with_uninstall(Some(LaunchCommand::delete_file(path)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_folders_url_and_lnk() {
        let tmp = tempfile::tempdir().unwrap();
        let games_dir = tmp.path().join("Games");
        let tools_dir = tmp.path().join("Tools");
        fs::create_dir_all(games_dir.join("art")).unwrap();
        fs::create_dir_all(&tools_dir).unwrap();

        let icon_file = games_dir.join("art").join("game.ico");
        fs::write(&icon_file, b"ico").unwrap();
        let url = games_dir.join("game.url");
        fs::write(
            &url,
            "[InternetShortcut]\r\nURL=steam://rungameid/620\r\nIconIndex=0\r\nIconFile=art/game.ico\r\n",
        )
        .unwrap();
        let lnk = tools_dir.join("app.lnk");
        fs::write(&lnk, b"L\0\0\0").unwrap();

        let scanner = ShortcutScanner::new(vec![
            ShortcutFolder::new("Games", &games_dir),
            ShortcutFolder::new("Tools", &tools_dir),
        ]);
        let games = scanner.scan().unwrap();
        assert_eq!(games.len(), 2);

        let g = &games[0];
        assert_eq!(g.title, "game");
        assert_eq!(g.platform, "Shortcuts (Games)");
        assert_eq!(g.icon_path, Some(icon_file.to_string_lossy().into_owned()));
        assert_eq!(
            g.launch_command,
            LaunchCommand::Open {
                path: url.clone(),
                working_dir: Some(games_dir.clone()),
            }
        );
        assert_eq!(g.uninstall_command, Some(LaunchCommand::delete_file(&url).unwrap()));

        let a = &games[1];
        assert_eq!(a.title, "app");
        assert_eq!(a.platform, "Shortcuts (Tools)");
        assert_eq!(a.icon_path, Some(lnk.to_string_lossy().into_owned()));
        assert_ne!(g.id, a.id);
    }

    #[test]
    fn url_icon_relative_and_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        let url = tmp.path().join("x.url");
        fs::write(&url, "[InternetShortcut]\nIconFile=icons/x.ico\n").unwrap();
        assert_eq!(url_icon_file(&url), Some(tmp.path().join("icons/x.ico")));

        let abs = tmp.path().join("abs.ico");
        fs::write(&url, format!("iconfile = \"{}\"\n", abs.display())).unwrap();
        assert_eq!(url_icon_file(&url), Some(abs));

        fs::write(&url, "[InternetShortcut]\nURL=http://example.com\n").unwrap();
        assert_eq!(url_icon_file(&url), None);
    }

    #[test]
    fn walks_recursively_and_ignores_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        fs::write(tmp.path().join("a/b/Deep.LNK"), b"L").unwrap();
        fs::write(tmp.path().join("readme.txt"), b"hi").unwrap();

        let games = ShortcutScanner::new(vec![ShortcutFolder::new("", tmp.path())])
            .scan()
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].title, "Deep");
        let dir_name = tmp.path().file_name().unwrap().to_string_lossy();
        assert_eq!(games[0].platform, format!("Shortcuts ({dir_name})"));
    }

    #[test]
    fn overlapping_folders_do_not_duplicate() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/x.url"), "[InternetShortcut]\n").unwrap();

        let games = ShortcutScanner::new(vec![
            ShortcutFolder::new("All", tmp.path()),
            ShortcutFolder::new("Sub", tmp.path().join("sub")),
        ])
        .scan()
        .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].platform, "Shortcuts (All)");
    }

    #[test]
    fn id_is_url_safe() {
        let id = shortcut_id(Path::new(r"C:\Users\me\Desktop\Game?.url"));
        assert!(id.starts_with("shortcut-"));
        assert!(!id.contains(['/', '+', '=']));
    }

    #[test]
    fn missing_folder_is_empty() {
        let scanner = ShortcutScanner::new(vec![ShortcutFolder::new("x", "/no/such/dir")]);
        assert!(scanner.scan().unwrap().is_empty());
    }
}
