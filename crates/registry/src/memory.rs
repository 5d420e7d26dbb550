//! In-memory registry, used on non-Windows hosts and in tests.

use std::collections::BTreeMap;

use crate::{Hive, Registry};

#[derive(Debug, Default, Clone)]
struct Key {
    /// Original spelling of the last path component.
    name: String,
    /// Lower-cased value name -> (original name, value).
    values: BTreeMap<String, (String, String)>,
}

/// A registry backed by a map. Lookups are case-insensitive like the real
/// thing.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    keys: BTreeMap<(Hive, String), Key>,
}

fn normalize(path: &str) -> String {
    path.trim_matches('\\').to_lowercase()
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `path` (and its parents) if missing.
    pub fn with_key(mut self, hive: Hive, path: &str) -> Self {
        self.ensure_key(hive, path);
        self
    }

    /// Sets a value, creating the key if needed.
    pub fn with_value(mut self, hive: Hive, path: &str, name: &str, value: &str) -> Self {
        self.set_value(hive, path, name, value);
        self
    }

    pub fn set_value(&mut self, hive: Hive, path: &str, name: &str, value: &str) {
        let key = self.ensure_key(hive, path);
        key.values
            .insert(name.to_lowercase(), (name.to_string(), value.to_string()));
    }

    fn ensure_key(&mut self, hive: Hive, path: &str) -> &mut Key {
        let trimmed = path.trim_matches('\\');
        let mut prefix = String::new();
        for part in trimmed.split('\\') {
            if !prefix.is_empty() {
                prefix.push('\\');
            }
            prefix.push_str(part);
            self.keys
                .entry((hive, normalize(&prefix)))
                .or_insert_with(|| Key {
                    name: part.to_string(),
                    values: BTreeMap::new(),
                });
        }
        self.keys
            .entry((hive, normalize(trimmed)))
            .or_default()
    }
}

impl Registry for MemoryRegistry {
    fn value(&self, hive: Hive, path: &str, name: &str) -> Option<String> {
        self.keys
            .get(&(hive, normalize(path)))?
            .values
            .get(&name.to_lowercase())
            .map(|(_, v)| v.clone())
    }

    fn subkeys(&self, hive: Hive, path: &str) -> Vec<String> {
        let parent = normalize(path);
        self.keys
            .iter()
            .filter(|((h, p), _)| {
                *h == hive
                    && p.strip_prefix(&parent)
                        .and_then(|rest| rest.strip_prefix('\\'))
                        .is_some_and(|rest| !rest.is_empty() && !rest.contains('\\'))
            })
            .map(|(_, key)| key.name.clone())
            .collect()
    }

    fn values(&self, hive: Hive, path: &str) -> Option<BTreeMap<String, String>> {
        let key = self.keys.get(&(hive, normalize(path)))?;
        Some(key.values.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lookup_is_case_insensitive() {
        let reg = MemoryRegistry::new().with_value(
            Hive::LocalMachine,
            r"SOFTWARE\Valve\Steam",
            "InstallPath",
            r"C:\Steam",
        );
        assert_eq!(
            reg.value(Hive::LocalMachine, r"software\valve\steam", "installpath")
                .as_deref(),
            Some(r"C:\Steam")
        );
        assert_eq!(reg.value(Hive::CurrentUser, r"SOFTWARE\Valve\Steam", "InstallPath"), None);
    }

    #[test]
    fn subkeys_lists_direct_children_only() {
        let reg = MemoryRegistry::new()
            .with_value(Hive::LocalMachine, r"SOFTWARE\GOG.com\Games\1207658924", "gameName", "Witcher")
            .with_value(Hive::LocalMachine, r"SOFTWARE\GOG.com\Games\1495134320", "gameName", "Gwent")
            .with_value(Hive::LocalMachine, r"SOFTWARE\GOG.com\Games\1495134320\Sub", "x", "y");

        let mut keys = reg.subkeys(Hive::LocalMachine, r"SOFTWARE\GOG.com\Games");
        keys.sort();
        assert_eq!(keys, ["1207658924", "1495134320"]);
    }

    #[test]
    fn values_preserve_original_names() {
        let reg = MemoryRegistry::new()
            .with_value(Hive::CurrentUser, r"A\B", "DisplayName", "Game")
            .with_value(Hive::CurrentUser, r"A\B", "Publisher", "Ubisoft");
        let values = reg.values(Hive::CurrentUser, r"a\b").unwrap();
        assert_eq!(values.get("DisplayName").map(String::as_str), Some("Game"));
        assert_eq!(values.len(), 2);
        assert!(reg.values(Hive::CurrentUser, r"A\C").is_none());
    }

    #[test]
    fn with_key_creates_empty_key() {
        let reg = MemoryRegistry::new().with_key(Hive::LocalMachine, r"SOFTWARE\Empty");
        assert_eq!(reg.values(Hive::LocalMachine, r"SOFTWARE\Empty").map(|v| v.len()), Some(0));
        assert_eq!(reg.subkeys(Hive::LocalMachine, "SOFTWARE"), ["Empty"]);
    }
}
