use std::fmt;

use serde::{Deserialize, Serialize};

/// A supported game source.
///
/// Declaration order is the platform-priority order used when sorting
/// by platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    Steam,
    Epic,
    Gog,
    Ea,
    Ubisoft,
    Xbox,
    Playnite,
    Shortcuts,
}

impl Platform {
    /// Returns all platforms in priority order.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Steam,
            Platform::Epic,
            Platform::Gog,
            Platform::Ea,
            Platform::Ubisoft,
            Platform::Xbox,
            Platform::Playnite,
            Platform::Shortcuts,
        ]
    }

    /// Human-readable label shown in the `platform` field of a game.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Epic => "Epic Games",
            Platform::Gog => "GOG",
            Platform::Ea => "EA",
            Platform::Ubisoft => "Ubisoft",
            Platform::Xbox => "Xbox",
            Platform::Playnite => "Playnite",
            Platform::Shortcuts => "Shortcuts",
        }
    }

    /// Prefix used to namespace game ids.
    ///
    /// Xbox ids are package family names, which already carry a publisher
    /// hash and never look like `<prefix>-...`.
    fn id_prefix(&self) -> Option<&'static str> {
        match self {
            Platform::Steam => Some("steam"),
            Platform::Epic => Some("epic"),
            Platform::Gog => Some("gog"),
            Platform::Ea => Some("ea"),
            Platform::Ubisoft => Some("ubisoft"),
            Platform::Xbox => None,
            Platform::Playnite => Some("playnite"),
            Platform::Shortcuts => Some("shortcut"),
        }
    }

    /// Builds the globally unique id for a vendor identifier.
    pub fn game_id(&self, native_id: &str) -> String {
        match self.id_prefix() {
            Some(prefix) => format!("{prefix}-{native_id}"),
            None => native_id.to_string(),
        }
    }

    /// Label parameterized with a sub-source, e.g. `Playnite (Steam)`.
    pub fn sub_label(&self, source: &str) -> String {
        let source = source.trim();
        if source.is_empty() {
            self.label().to_string()
        } else {
            format!("{} ({source})", self.label())
        }
    }

    /// Recognizes a label produced by [`label`](Self::label) or
    /// [`sub_label`](Self::sub_label).
    pub fn from_label(label: &str) -> Option<Platform> {
        let base = match label.find(" (") {
            Some(idx) if label.ends_with(')') => &label[..idx],
            _ => label,
        };
        Platform::all()
            .iter()
            .copied()
            .find(|p| p.label() == base)
    }

    /// Sort rank for a label; unknown labels rank after every platform.
    pub fn rank(label: &str) -> usize {
        Platform::from_label(label)
            .map(|p| p as usize)
            .unwrap_or(Platform::all().len())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_namespaced() {
        assert_eq!(Platform::Steam.game_id("440"), "steam-440");
        assert_eq!(Platform::Gog.game_id("440"), "gog-440");
        assert_ne!(Platform::Steam.game_id("440"), Platform::Gog.game_id("440"));
        assert_eq!(
            Platform::Xbox.game_id("Microsoft.Forza_8wekyb3d8bbwe"),
            "Microsoft.Forza_8wekyb3d8bbwe"
        );
    }

    #[test]
    fn same_vendor_id_never_collides_across_platforms() {
        let ids: std::collections::HashSet<String> =
            Platform::all().iter().map(|p| p.game_id("42")).collect();
        assert_eq!(ids.len(), Platform::all().len());
    }

    #[test]
    fn sub_label_formats_source() {
        assert_eq!(Platform::Playnite.sub_label("Steam"), "Playnite (Steam)");
        assert_eq!(Platform::Playnite.sub_label("  "), "Playnite");
    }

    #[test]
    fn from_label_accepts_parameterized_labels() {
        assert_eq!(Platform::from_label("Epic Games"), Some(Platform::Epic));
        assert_eq!(
            Platform::from_label("Shortcuts (Emulators)"),
            Some(Platform::Shortcuts)
        );
        assert_eq!(Platform::from_label("Itch"), None);
    }

    #[test]
    fn unknown_labels_rank_last() {
        assert_eq!(Platform::rank("Steam"), 0);
        assert!(Platform::rank("Itch") > Platform::rank("Shortcuts (Roms)"));
    }
}
