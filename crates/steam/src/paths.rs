use std::path::{Path, PathBuf};

use gamedeck_registry::{Hive, Registry};

use crate::SteamError;

/// Registry locations of the Steam root, in lookup order.
const REGISTRY_ROOTS: &[(Hive, &str, &str)] = &[
    (Hive::CurrentUser, r"Software\Valve\Steam", "SteamPath"),
    (Hive::LocalMachine, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"),
    (Hive::LocalMachine, r"SOFTWARE\Valve\Steam", "InstallPath"),
];

/// Provides access to Steam directory paths.
#[derive(Debug, Clone)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Locates the Steam root: override, then default locations, then the
    /// registry. First hit wins.
    pub fn locate(override_dir: Option<&Path>, registry: &dyn Registry) -> Result<Self, SteamError> {
        if let Some(dir) = override_dir {
            if dir.is_dir() {
                return Ok(Self::with_base(dir));
            }
            tracing::warn!(path = %dir.display(), "configured Steam directory does not exist");
        }

        if let Some(dir) = default_roots().into_iter().find(|d| d.is_dir()) {
            return Ok(Self::with_base(dir));
        }

        registry
            .first_value(REGISTRY_ROOTS)
            .map(PathBuf::from)
            .filter(|d| d.is_dir())
            .map(Self::with_base)
            .ok_or(SteamError::NotFound)
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the root library's `steamapps` directory.
    pub fn steamapps_dir(&self) -> PathBuf {
        steamapps_dir_in(&self.base_dir)
    }

    /// Returns the path to `libraryfolders.vdf`.
    pub fn library_folders_path(&self) -> PathBuf {
        self.steamapps_dir().join("libraryfolders.vdf")
    }
}

/// Returns the `steamapps` directory of a library root.
///
/// Older Linux installs spell it `SteamApps`.
pub(crate) fn steamapps_dir_in(library: &Path) -> PathBuf {
    let lower = library.join("steamapps");
    if lower.is_dir() {
        return lower;
    }
    let legacy = library.join("SteamApps");
    if legacy.is_dir() { legacy } else { lower }
}

/// Returns the well-known Steam roots for this OS, in priority order.
#[cfg(target_os = "windows")]
fn default_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files (x86)\Steam"),
        PathBuf::from(r"C:\Program Files\Steam"),
    ]
}

#[cfg(not(target_os = "windows"))]
fn default_roots() -> Vec<PathBuf> {
    let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
        return Vec::new();
    };
    vec![
        // Primary location: ~/.steam/steam
        home.join(".steam").join("steam"),
        home.join(".local").join("share").join("Steam"),
        // Flatpak location
        home.join(".var")
            .join("app")
            .join("com.valvesoftware.Steam")
            .join(".steam")
            .join("steam"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamedeck_registry::MemoryRegistry;

    #[test]
    fn paths_with_base() {
        let paths = Paths::with_base("/tmp/steam");
        assert_eq!(paths.base_dir(), &PathBuf::from("/tmp/steam"));
        assert_eq!(paths.steamapps_dir(), PathBuf::from("/tmp/steam/steamapps"));
        assert_eq!(
            paths.library_folders_path(),
            PathBuf::from("/tmp/steam/steamapps/libraryfolders.vdf")
        );
    }

    #[test]
    fn override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::locate(Some(tmp.path()), &MemoryRegistry::new()).unwrap();
        assert_eq!(paths.base_dir(), &tmp.path().to_path_buf());
    }

    #[test]
    fn registry_is_last_resort() {
        let tmp = tempfile::tempdir().unwrap();
        let reg = MemoryRegistry::new().with_value(
            Hive::LocalMachine,
            r"SOFTWARE\WOW6432Node\Valve\Steam",
            "InstallPath",
            &tmp.path().to_string_lossy(),
        );
        let missing = tmp.path().join("nope");
        let paths = Paths::locate(Some(&missing), &reg).unwrap();
        // Either a real default install on the host or the registry value.
        assert!(paths.base_dir().is_dir());
    }

    #[test]
    fn legacy_steamapps_spelling() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("SteamApps")).unwrap();
        assert_eq!(steamapps_dir_in(tmp.path()), tmp.path().join("SteamApps"));
    }
}
