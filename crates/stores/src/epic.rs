//! Epic Games Launcher: per-title `*.item` manifests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamedeck_model::{Game, LaunchCommand, Platform, icon};
use gamedeck_registry::{Hive, Registry};
use serde::Deserialize;

use crate::StoreError;
use crate::lenient::from_str_lenient;

const REGISTRY_DATA_PATH: &[(Hive, &str, &str)] = &[
    (
        Hive::LocalMachine,
        r"SOFTWARE\WOW6432Node\Epic Games\EpicGamesLauncher",
        "AppDataPath",
    ),
    (
        Hive::LocalMachine,
        r"SOFTWARE\Epic Games\EpicGamesLauncher",
        "AppDataPath",
    ),
];

const DEFAULT_MANIFESTS: &str = r"C:\ProgramData\Epic\EpicGamesLauncher\Data\Manifests";

/// One `.item` manifest. Only the fields used for normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct EpicManifest {
    display_name: String,
    app_name: String,
    catalog_namespace: String,
    catalog_item_id: String,
    install_location: String,
    launch_executable: String,
    #[serde(rename = "bIsApplication")]
    is_application: bool,
    #[serde(rename = "bIsIncompleteInstall")]
    is_incomplete_install: bool,
}

/// Scans Epic Games Launcher manifests.
#[derive(Clone)]
pub struct EpicScanner {
    manifests_override: Option<PathBuf>,
    registry: Arc<dyn Registry>,
}

impl EpicScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            manifests_override: None,
            registry,
        }
    }

    /// Uses `dir` as the manifests directory.
    pub fn with_manifests_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifests_override = Some(dir.into());
        self
    }

    /// Returns the manifests directory: override, registry, then the
    /// well-known machine-wide locations.
    fn manifests_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.manifests_override {
            return dir.is_dir().then(|| dir.clone());
        }

        let from_registry = self
            .registry
            .first_value(REGISTRY_DATA_PATH)
            .map(|p| PathBuf::from(p).join("Manifests"));
        let from_env = std::env::var_os("PROGRAMDATA").map(|p| {
            PathBuf::from(p)
                .join("Epic")
                .join("EpicGamesLauncher")
                .join("Data")
                .join("Manifests")
        });

        [from_registry, from_env, Some(PathBuf::from(DEFAULT_MANIFESTS))]
            .into_iter()
            .flatten()
            .find(|d| d.is_dir())
    }

    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let Some(dir) = self.manifests_dir() else {
            tracing::debug!("Epic manifests directory not found");
            return Ok(Vec::new());
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("item"))
            })
            .collect();
        paths.sort();

        let mut games = Vec::new();
        for path in paths {
            match read_manifest(&path) {
                Ok(manifest) => {
                    if let Some(game) = normalize(manifest)? {
                        games.push(game);
                    }
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping Epic manifest");
                }
            }
        }
        Ok(games)
    }
}

fn read_manifest(path: &Path) -> Result<EpicManifest, StoreError> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(from_str_lenient(&text)?)
}

/// Returns `None` for records that are not installed applications.
fn normalize(m: EpicManifest) -> Result<Option<Game>, StoreError> {
    if !m.is_application || m.install_location.trim().is_empty() || m.app_name.is_empty() {
        return Ok(None);
    }
    if m.is_incomplete_install {
        tracing::debug!(app = %m.app_name, "skipping incomplete Epic install");
        return Ok(None);
    }

    let uri = if m.catalog_namespace.is_empty() || m.catalog_item_id.is_empty() {
        format!(
            "com.epicgames.launcher://apps/{}?action=launch&silent=true",
            m.app_name
        )
    } else {
        format!(
            "com.epicgames.launcher://apps/{}%3A{}%3A{}?action=launch&silent=true",
            m.catalog_namespace, m.catalog_item_id, m.app_name
        )
    };

    let install_dir = PathBuf::from(&m.install_location);
    let icon = icon::probe_install_dir(&install_dir).or_else(|| {
        if m.launch_executable.is_empty() {
            return None;
        }
        icon::resolve(Some(&install_dir.join(&m.launch_executable)))
            .map(|p| p.to_string_lossy().into_owned())
    });

    let title = if m.display_name.trim().is_empty() {
        m.app_name.clone()
    } else {
        m.display_name.clone()
    };

    Ok(Some(
        Game::new(
            Platform::Epic.game_id(&m.app_name),
            title,
            Platform::Epic.label(),
            LaunchCommand::uri(uri)?,
        )
        .with_icon(icon),
    ))
}
