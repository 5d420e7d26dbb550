//! Per-user directories.

use std::path::PathBuf;

/// Application directory name under the config dir.
pub const APP_DIR: &str = "gamedeck";

/// Returns the platform-specific config directory.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir().map(|h| h.join(".config")))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(PathBuf::from)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        home_dir().map(|h| h.join(".config"))
    }
}

/// Returns `<config dir>/gamedeck`.
pub fn app_config_dir() -> Option<PathBuf> {
    config_dir().map(|d| d.join(APP_DIR))
}

/// Returns `$HOME` (or `%USERPROFILE%`).
pub fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}
