//! Ubisoft Connect titles found by publisher in the uninstall registry.

use std::path::Path;
use std::sync::Arc;

use gamedeck_model::{Game, LaunchCommand, Platform, icon};
use gamedeck_registry::{Registry, UninstallEntry, uninstall_entries};

use crate::StoreError;

/// Publisher spellings seen on Ubisoft titles.
pub const PUBLISHERS: &[&str] = &["ubisoft", "ubi soft", "ubisoft entertainment"];

const INSTALL_KEY_PREFIX: &str = "Uplay Install ";

/// Returns the numeric install id from a `Uplay Install <id>` subkey name.
pub fn install_id(key_name: &str) -> Option<&str> {
    let id = key_name.strip_prefix(INSTALL_KEY_PREFIX)?.trim();
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
}

#[derive(Clone)]
pub struct UbisoftScanner {
    registry: Arc<dyn Registry>,
}

impl UbisoftScanner {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    pub fn scan(&self) -> Result<Vec<Game>, StoreError> {
        let mut games = Vec::new();
        for entry in uninstall_entries(self.registry.as_ref()) {
            if !entry.published_by(PUBLISHERS) {
                continue;
            }
            let Some(id) = install_id(&entry.key_name) else {
                tracing::debug!(key = %entry.key_name, "Ubisoft entry without install id");
                continue;
            };
            games.push(normalize(&entry, id)?);
        }
        Ok(games)
    }
}

fn normalize(entry: &UninstallEntry, id: &str) -> Result<Game, StoreError> {
    let icon = icon::resolve_str(entry.display_icon.as_deref()).or_else(|| {
        entry
            .install_location
            .as_deref()
            .and_then(|dir| icon::probe_install_dir(Path::new(dir)))
    });

    Ok(Game::new(
        Platform::Ubisoft.game_id(id),
        entry.display_name.clone(),
        Platform::Ubisoft.label(),
        LaunchCommand::uri(format!("uplay://launch/{id}/0"))?,
    )
    .with_icon(icon)
    .with_uninstall(Some(LaunchCommand::uri(format!("uplay://uninstall/{id}"))?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedeck_registry::{Hive, MemoryRegistry};

    const UNINSTALL: &str = r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall";

    #[test]
    fn install_id_parsing() {
        assert_eq!(install_id("Uplay Install 635"), Some("635"));
        assert_eq!(install_id("Uplay Install "), None);
        assert_eq!(install_id("Uplay Install abc"), None);
        assert_eq!(install_id("{GUID}"), None);
    }

    #[test]
    fn scan_keeps_only_entries_with_id() {
        let tmp = tempfile::tempdir().unwrap();
        let icon = tmp.path().join("ac.ico");
        std::fs::write(&icon, b"ico").unwrap();

        let with_id = format!(r"{UNINSTALL}\Uplay Install 635");
        let without_id = format!(r"{UNINSTALL}\{{AC-REDIST}}");
        let reg = MemoryRegistry::new()
            .with_value(Hive::LocalMachine, &with_id, "DisplayName", "Assassin's Creed Origins")
            .with_value(Hive::LocalMachine, &with_id, "Publisher", "Ubisoft")
            .with_value(Hive::LocalMachine, &with_id, "DisplayIcon", &icon.to_string_lossy())
            .with_value(Hive::LocalMachine, &without_id, "DisplayName", "AC Redistributable")
            .with_value(Hive::LocalMachine, &without_id, "Publisher", "Ubisoft Entertainment");

        let games = UbisoftScanner::new(Arc::new(reg)).scan().unwrap();
        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert_eq!(game.id, "ubisoft-635");
        assert_eq!(game.platform, "Ubisoft");
        assert_eq!(game.launch_command, LaunchCommand::uri("uplay://launch/635/0").unwrap());
        assert_eq!(
            game.uninstall_command,
            Some(LaunchCommand::uri("uplay://uninstall/635").unwrap())
        );
        assert_eq!(game.icon_path, Some(icon.to_string_lossy().into_owned()));
    }

    #[test]
    fn other_publishers_are_ignored() {
        let key = format!(r"{UNINSTALL}\Uplay Install 1");
        let reg = MemoryRegistry::new()
            .with_value(Hive::LocalMachine, &key, "DisplayName", "Something")
            .with_value(Hive::LocalMachine, &key, "Publisher", "Valve");
        assert!(UbisoftScanner::new(Arc::new(reg)).scan().unwrap().is_empty());
    }
}
