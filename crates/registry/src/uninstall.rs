//! The generic "installed programs" branch.
//!
//! Several storefronts keep no catalog of their own, so their games are
//! recovered from the uninstall entries Windows keeps for every installer.

use std::collections::{BTreeMap, HashSet};

use crate::{Hive, Registry};

/// The three uninstall roots, in lookup order.
pub const UNINSTALL_ROOTS: &[(Hive, &str)] = &[
    (
        Hive::LocalMachine,
        r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    ),
    (
        Hive::LocalMachine,
        r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall",
    ),
    (
        Hive::CurrentUser,
        r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall",
    ),
];

/// One uninstall entry with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallEntry {
    /// Subkey name, e.g. `Steam App 440` or `{GUID}`.
    pub key_name: String,
    pub display_name: String,
    pub publisher: Option<String>,
    pub install_location: Option<String>,
    pub display_icon: Option<String>,
    pub uninstall_string: Option<String>,
}

impl UninstallEntry {
    fn from_values(key_name: &str, values: &BTreeMap<String, String>) -> Option<Self> {
        let get = |name: &str| {
            values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Some(Self {
            key_name: key_name.to_string(),
            display_name: get("DisplayName")?,
            publisher: get("Publisher"),
            install_location: get("InstallLocation").map(|p| p.trim_matches('"').to_string()),
            display_icon: get("DisplayIcon"),
            uninstall_string: get("UninstallString"),
        })
    }

    /// Case-insensitive substring match of the publisher against known
    /// spellings.
    pub fn published_by(&self, spellings: &[&str]) -> bool {
        let Some(publisher) = &self.publisher else {
            return false;
        };
        let publisher = publisher.to_lowercase();
        spellings
            .iter()
            .any(|s| publisher.contains(&s.to_lowercase()))
    }
}

/// Enumerates every uninstall entry that has a display name.
///
/// Entries are de-duplicated by subkey name; the first root holding a named
/// entry wins.
pub fn uninstall_entries(registry: &dyn Registry) -> Vec<UninstallEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (hive, root) in UNINSTALL_ROOTS {
        for name in registry.subkeys(*hive, root) {
            let key = name.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            let path = format!(r"{root}\{name}");
            let Some(values) = registry.values(*hive, &path) else {
                continue;
            };
            if let Some(entry) = UninstallEntry::from_values(&name, &values) {
                seen.insert(key);
                entries.push(entry);
            }
        }
    }

    tracing::debug!(count = entries.len(), "enumerated uninstall entries");
    entries
}

/// Looks up a single uninstall entry by subkey name.
pub fn uninstall_entry(registry: &dyn Registry, key_name: &str) -> Option<UninstallEntry> {
    UNINSTALL_ROOTS.iter().find_map(|(hive, root)| {
        let values = registry.values(*hive, &format!(r"{root}\{key_name}"))?;
        UninstallEntry::from_values(key_name, &values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRegistry;

    const HKLM_ROOT: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall";
    const WOW_ROOT: &str = r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall";

    fn sample() -> MemoryRegistry {
        MemoryRegistry::new()
            .with_value(Hive::LocalMachine, &format!(r"{WOW_ROOT}\Uplay Install 635"), "DisplayName", "Far Cry 5")
            .with_value(Hive::LocalMachine, &format!(r"{WOW_ROOT}\Uplay Install 635"), "Publisher", "Ubisoft")
            .with_value(Hive::LocalMachine, &format!(r"{WOW_ROOT}\Uplay Install 635"), "InstallLocation", "\"D:\\Games\\Far Cry 5\"")
            .with_value(Hive::LocalMachine, &format!(r"{HKLM_ROOT}\NoName"), "Publisher", "Somebody")
            .with_value(Hive::CurrentUser, &format!(r"{HKLM_ROOT}\Uplay Install 635"), "DisplayName", "Duplicate")
    }

    #[test]
    fn enumerates_named_entries_once() {
        let entries = uninstall_entries(&sample());
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.display_name, "Far Cry 5");
        assert_eq!(entry.install_location.as_deref(), Some(r"D:\Games\Far Cry 5"));
        assert_eq!(entry.key_name, "Uplay Install 635");
    }

    #[test]
    fn publisher_matching_is_case_insensitive() {
        let entry = uninstall_entry(&sample(), "Uplay Install 635").unwrap();
        assert!(entry.published_by(&["UBISOFT"]));
        assert!(!entry.published_by(&["electronic arts"]));
    }

    #[test]
    fn entry_without_publisher_never_matches() {
        let reg = MemoryRegistry::new().with_value(
            Hive::LocalMachine,
            &format!(r"{HKLM_ROOT}\Thing"),
            "DisplayName",
            "Thing",
        );
        let entry = uninstall_entry(&reg, "Thing").unwrap();
        assert!(!entry.published_by(&["ubisoft"]));
    }

    #[test]
    fn nameless_key_does_not_shadow_later_root() {
        let reg = MemoryRegistry::new()
            .with_value(Hive::LocalMachine, &format!(r"{HKLM_ROOT}\Foo"), "Publisher", "Acme")
            .with_value(Hive::LocalMachine, &format!(r"{WOW_ROOT}\Foo"), "DisplayName", "Foo Game")
            .with_value(Hive::CurrentUser, &format!(r"{HKLM_ROOT}\Foo"), "DisplayName", "Shadowed");
        let entries = uninstall_entries(&reg);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Foo Game");
    }

    #[test]
    fn missing_entry_is_none() {
        assert!(uninstall_entry(&sample(), "Steam App 1").is_none());
    }
}
