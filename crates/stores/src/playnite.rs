//! Playnite library manager.
//!
//! Playnite aggregates other storefronts, so each record carries its own
//! source. The export companion writes a consolidated snapshot to
//! `ExtensionsData/library_export.json`; when that is missing the per-title
//! JSON store under `library/games` is read instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use gamedeck_model::{Game, GameDetails, LaunchCommand, Platform, dirs, icon};
use gamedeck_registry::{Registry, uninstall_entries};
use serde::Deserialize;

use crate::StoreError;
use crate::lenient::from_str_lenient;

/// Snapshot written by the export companion, relative to the data dir.
pub const SNAPSHOT_PATH: &str = "ExtensionsData/library_export.json";

/// Playnite processes terminated before a relaunch.
pub const PLAYNITE_PROCESSES: &[&str] = &["Playnite.DesktopApp.exe", "Playnite.FullscreenApp.exe"];

/// URI that reopens Playnite.
pub const PLAYNITE_OPEN_URI: &str = "playnite://playnite/";

const GAMES_DIR: &str = "library/games";
const FILES_DIR: &str = "library/files";

/// A string, or an object with a `Name` (Playnite serializes both).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Named {
    Plain(String),
    Object {
        #[serde(rename = "Name")]
        name: String,
    },
}

impl Named {
    fn into_name(self) -> String {
        match self {
            Named::Plain(name) | Named::Object { name } => name,
        }
    }
}

/// `ReleaseDate` is either a plain string or `{ "ReleaseDate": "..." }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ReleaseDate {
    Plain(String),
    Object {
        #[serde(rename = "ReleaseDate")]
        date: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct PlayniteRecord {
    id: String,
    name: String,
    source: Option<Named>,
    is_installed: bool,
    hidden: bool,
    favorite: bool,
    icon: Option<String>,
    cover_image: Option<String>,
    description: Option<String>,
    developers: Option<Vec<Named>>,
    publishers: Option<Vec<Named>>,
    genres: Option<Vec<Named>>,
    release_date: Option<ReleaseDate>,
    last_activity: Option<String>,
    added: Option<String>,
}

/// Parses Playnite timestamps: RFC 3339, or a naive local-less datetime
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Normalizes a release date to `YYYY-MM-DD` when it parses.
fn normalize_release_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(dt) = parse_timestamp(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.to_string();
    }
    raw.to_string()
}

#[derive(Clone)]
pub struct PlayniteScanner {
    data_override: Option<PathBuf>,
    registry: Arc<dyn Registry>,
}

impl PlayniteScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            data_override: None,
            registry,
        }
    }

    /// Uses `dir` as the Playnite data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_override = Some(dir.into());
        self
    }

    /// Data directory: override, `%APPDATA%\Playnite`, `~/.config/Playnite`,
    /// then a portable install found in the uninstall registry.
    pub fn data_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.data_override {
            return dir.is_dir().then(|| dir.clone());
        }

        let appdata = std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Playnite"));
        let config = dirs::home_dir().map(|h| h.join(".config").join("Playnite"));
        [appdata, config]
            .into_iter()
            .flatten()
            .find(|d| d.is_dir())
            .or_else(|| self.portable_dir())
    }

    fn portable_dir(&self) -> Option<PathBuf> {
        uninstall_entries(self.registry.as_ref())
            .into_iter()
            .find(|e| e.display_name.eq_ignore_ascii_case("Playnite"))
            .and_then(|e| e.install_location)
            .map(PathBuf::from)
            .filter(|d| d.is_dir())
    }

    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let Some(data_dir) = self.data_dir() else {
            tracing::debug!("Playnite data directory not found");
            return Ok(Vec::new());
        };

        let snapshot = data_dir.join(SNAPSHOT_PATH);
        let records = match snapshot.is_file().then(|| read_snapshot(&snapshot)) {
            Some(Ok(records)) => records,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "unreadable Playnite snapshot, reading per-title store");
                read_store(&data_dir.join(GAMES_DIR))
            }
            None => {
                tracing::debug!("no Playnite export snapshot, reading per-title store");
                read_store(&data_dir.join(GAMES_DIR))
            }
        };

        let files_dir = data_dir.join(FILES_DIR);
        let mut games = Vec::new();
        for record in records {
            if !record.is_installed || record.hidden {
                continue;
            }
            match normalize(record, &files_dir) {
                Ok(Some(game)) => games.push(game),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "skipping Playnite record"),
            }
        }
        Ok(games)
    }
}

/// Records that fail to deserialize are skipped one at a time; only an
/// unreadable file or a non-array document fails the whole snapshot.
fn read_snapshot(path: &Path) -> Result<Vec<PlayniteRecord>, StoreError> {
    let bytes = fs::read(path)?;
    let values: Vec<serde_json::Value> = from_str_lenient(&String::from_utf8_lossy(&bytes))?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed Playnite record");
                None
            }
        })
        .collect())
}

fn read_store(dir: &Path) -> Vec<PlayniteRecord> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let parsed: Result<PlayniteRecord, StoreError> = fs::read(&path)
                .map_err(StoreError::from)
                .and_then(|b| Ok(from_str_lenient(&String::from_utf8_lossy(&b))?));
            match parsed {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping Playnite game file");
                    None
                }
            }
        })
        .collect()
}

/// URLs are kept as-is; paths are resolved against the library files dir.
fn resolve_media(raw: Option<&str>, files_dir: &Path) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let candidate = Path::new(raw);
    let path = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        files_dir.join(raw.replace('\\', "/"))
    };
    icon::resolve(Some(&path)).map(|p| p.to_string_lossy().into_owned())
}

fn names(list: Option<Vec<Named>>) -> Vec<String> {
    list.unwrap_or_default()
        .into_iter()
        .map(Named::into_name)
        .filter(|n| !n.trim().is_empty())
        .collect()
}

fn normalize(r: PlayniteRecord, files_dir: &Path) -> Result<Option<Game>, StoreError> {
    let id = r.id.trim();
    if id.is_empty() || r.name.trim().is_empty() {
        return Ok(None);
    }

    let source = r.source.map(Named::into_name).filter(|s| !s.trim().is_empty());
    let launch = LaunchCommand::uri(format!("playnite://playnite/start/{id}"))?;

    let details = GameDetails {
        description: r.description.filter(|d| !d.trim().is_empty()),
        developers: names(r.developers),
        publishers: names(r.publishers),
        genres: names(r.genres),
        release_date: r.release_date.map(|d| match d {
            ReleaseDate::Plain(s) | ReleaseDate::Object { date: s } => normalize_release_date(&s),
        }),
        last_activity: r.last_activity.as_deref().and_then(parse_timestamp),
        favorite: r.favorite,
        added: r.added.as_deref().and_then(parse_timestamp),
        cover_image: resolve_media(r.cover_image.as_deref(), files_dir),
        source: source.clone(),
    };

    Ok(Some(
        Game::new(
            Platform::Playnite.game_id(id),
            r.name.trim(),
            Platform::Playnite.sub_label(source.as_deref().unwrap_or_default()),
            launch,
        )
        .with_icon(resolve_media(r.icon.as_deref(), files_dir))
        .with_details(details),
    ))
}
