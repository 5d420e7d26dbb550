//! Settings persistence.
//!
//! Settings are stored as TOML:
//! - Linux: `~/.config/gamedeck/settings.toml`
//! - Windows: `%APPDATA%/gamedeck/settings.toml`

use std::path::{Path, PathBuf};

use anyhow::Context;
use gamedeck_library::Settings;

const FILE_NAME: &str = "settings.toml";

/// Loads settings from `path`, writing defaults if the file is missing.
pub fn load_from(path: &Path) -> anyhow::Result<Settings> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    } else {
        let settings = Settings::default();
        save_to(&settings, path)?;
        Ok(settings)
    }
}

pub fn save_to(settings: &Settings, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content)?;

    tracing::debug!(path = %path.display(), "settings saved");
    Ok(())
}

/// Returns the platform-specific settings file path.
pub fn settings_path() -> anyhow::Result<PathBuf> {
    gamedeck_model::dirs::app_config_dir()
        .map(|dir| dir.join(FILE_NAME))
        .context("cannot determine config directory")
}
