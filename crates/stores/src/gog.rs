//! GOG Galaxy: registry catalog under `GOG.com\Games`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gamedeck_model::{Game, LaunchCommand, Platform, icon};
use gamedeck_registry::{Hive, Registry};

use crate::StoreError;

const GAMES_KEY: &str = r"SOFTWARE\WOW6432Node\GOG.com\Games";
const CLIENT_KEY: &str = r"SOFTWARE\WOW6432Node\GOG.com\GalaxyClient\paths";
const CLIENT_EXE: &str = "GalaxyClient.exe";
const DEFAULT_CLIENT_PATHS: &[&str] = &[
    r"C:\Program Files (x86)\GOG Galaxy\GalaxyClient.exe",
    r"C:\Program Files\GOG Galaxy\GalaxyClient.exe",
];

/// One subkey of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CatalogEntry {
    game_id: String,
    name: String,
    path: String,
    build_id: Option<String>,
    exe: Option<String>,
}

/// Scans the GOG Galaxy registry catalog.
#[derive(Clone)]
pub struct GogScanner {
    client_override: Option<PathBuf>,
    registry: Arc<dyn Registry>,
}

impl GogScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self {
            client_override: None,
            registry,
        }
    }

    /// Uses `client` as the Galaxy client executable.
    pub fn with_client(mut self, client: impl Into<PathBuf>) -> Self {
        self.client_override = Some(client.into());
        self
    }

    /// Locates `GalaxyClient.exe`: override, default paths, registry.
    fn client_path(&self) -> Option<PathBuf> {
        if let Some(client) = &self.client_override {
            return client.is_file().then(|| client.clone());
        }

        let defaults = DEFAULT_CLIENT_PATHS.iter().map(PathBuf::from);
        let from_registry = self
            .registry
            .value(Hive::LocalMachine, CLIENT_KEY, "client")
            .map(|dir| PathBuf::from(dir.trim().trim_matches('"')).join(CLIENT_EXE));

        defaults.chain(from_registry).find(|p| p.is_file())
    }

    fn catalog(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        for subkey in self.registry.subkeys(Hive::LocalMachine, GAMES_KEY) {
            let key = format!(r"{GAMES_KEY}\{subkey}");
            let get = |name: &str| {
                self.registry
                    .value(Hive::LocalMachine, &key, name)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            };

            let (Some(name), Some(path)) = (get("gameName"), get("path")) else {
                tracing::debug!(key = %subkey, "GOG entry without name or path");
                continue;
            };
            entries.push(CatalogEntry {
                game_id: get("gameID").unwrap_or_else(|| subkey.clone()),
                name,
                path,
                build_id: get("buildId"),
                exe: get("exe"),
            });
        }
        entries
    }

    /// Zero catalog entries is an empty result; entries without a client
    /// is a detection failure.
    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let catalog = self.catalog();
        if catalog.is_empty() {
            return Ok(Vec::new());
        }

        let client = self.client_path().ok_or(StoreError::GalaxyClientNotFound)?;
        let client_dir = client.parent().map(Path::to_path_buf);

        let mut games = Vec::new();
        for entry in catalog {
            let args = vec![
                "/command=runGame".to_string(),
                format!("/gameId={}", entry.game_id),
                format!("/path={}", entry.path),
            ];
            let launch = LaunchCommand::executable(&client, args, client_dir.clone())?;

            let install_dir = PathBuf::from(&entry.path);
            let uninstaller = install_dir.join("unins000.exe");
            let uninstall = if uninstaller.is_file() {
                Some(LaunchCommand::executable(
                    uninstaller,
                    Vec::new(),
                    Some(install_dir.clone()),
                )?)
            } else {
                None
            };

            tracing::trace!(id = %entry.game_id, build = ?entry.build_id, "GOG title");
            games.push(
                Game::new(
                    Platform::Gog.game_id(&entry.game_id),
                    entry.name.clone(),
                    Platform::Gog.label(),
                    launch,
                )
                .with_icon(find_icon(&install_dir, &entry))
                .with_uninstall(uninstall),
            );
        }
        Ok(games)
    }
}

/// `goggame-<id>.ico` in the install directory, then the `exe` value.
fn find_icon(install_dir: &Path, entry: &CatalogEntry) -> Option<String> {
    let ico = install_dir.join(format!("goggame-{}.ico", entry.game_id));
    icon::resolve(Some(&ico))
        .map(|p| p.to_string_lossy().into_owned())
        .or_else(|| icon::resolve_str(entry.exe.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedeck_registry::MemoryRegistry;
    use std::fs;

    fn catalog_registry(install: &Path) -> MemoryRegistry {
        let key = format!(r"{GAMES_KEY}\1207658924");
        MemoryRegistry::new()
            .with_value(Hive::LocalMachine, &key, "gameName", "Unreal Gold")
            .with_value(Hive::LocalMachine, &key, "gameID", "1207658924")
            .with_value(Hive::LocalMachine, &key, "path", &install.to_string_lossy())
            .with_value(Hive::LocalMachine, &key, "buildId", "5511")
    }

    #[test]
    fn empty_catalog_is_empty_result() {
        let scanner = GogScanner::new(Arc::new(MemoryRegistry::new()));
        assert!(scanner.scan().unwrap().is_empty());
    }

    #[test]
    fn catalog_without_client_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let scanner = GogScanner::new(Arc::new(catalog_registry(tmp.path())))
            .with_client(tmp.path().join("missing").join(CLIENT_EXE));
        assert!(matches!(scanner.scan(), Err(StoreError::GalaxyClientNotFound)));
    }

    #[test]
    fn builds_client_launch_and_uninstaller() {
        let tmp = tempfile::tempdir().unwrap();
        let client_dir = tmp.path().join("GOG Galaxy");
        fs::create_dir_all(&client_dir).unwrap();
        let client = client_dir.join(CLIENT_EXE);
        fs::write(&client, b"MZ").unwrap();

        let install = tmp.path().join("Unreal Gold");
        fs::create_dir_all(&install).unwrap();
        fs::write(install.join("unins000.exe"), b"MZ").unwrap();
        fs::write(install.join("goggame-1207658924.ico"), b"ico").unwrap();

        let games = GogScanner::new(Arc::new(catalog_registry(&install)))
            .with_client(&client)
            .scan()
            .unwrap();

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.id, "gog-1207658924");
        assert_eq!(game.platform, "GOG");
        assert_eq!(
            game.launch_command,
            LaunchCommand::Executable {
                program: client.clone(),
                args: vec![
                    "/command=runGame".into(),
                    "/gameId=1207658924".into(),
                    format!("/path={}", install.display()),
                ],
                working_dir: Some(client_dir),
            }
        );
        assert_eq!(
            game.uninstall_command,
            Some(
                LaunchCommand::executable(install.join("unins000.exe"), vec![], Some(install.clone()))
                    .unwrap()
            )
        );
        assert_eq!(
            game.icon_path,
            Some(install.join("goggame-1207658924.ico").to_string_lossy().into_owned())
        );
    }

    #[test]
    fn client_from_registry() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CLIENT_EXE), b"MZ").unwrap();
        let reg = MemoryRegistry::new().with_value(
            Hive::LocalMachine,
            CLIENT_KEY,
            "client",
            &tmp.path().to_string_lossy(),
        );
        let scanner = GogScanner::new(Arc::new(reg));
        assert_eq!(scanner.client_path(), Some(tmp.path().join(CLIENT_EXE)));
    }

    #[test]
    fn entries_without_path_are_skipped() {
        let key = format!(r"{GAMES_KEY}\42");
        let reg = MemoryRegistry::new().with_value(Hive::LocalMachine, &key, "gameName", "Orphan");
        let scanner = GogScanner::new(Arc::new(reg));
        assert!(scanner.catalog().is_empty());
    }
}
