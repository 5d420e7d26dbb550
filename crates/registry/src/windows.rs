//! `winreg` backend.

use std::collections::BTreeMap;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};

use crate::{Hive, Registry};

pub(crate) struct WindowsRegistry;

fn open(hive: Hive, path: &str) -> Option<RegKey> {
    let root = match hive {
        Hive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        Hive::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
    };
    match root.open_subkey_with_flags(path, KEY_READ) {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::trace!(?hive, path, error = %e, "registry key not readable");
            None
        }
    }
}

/// Reads a value as text, accepting string and integer types.
fn read(key: &RegKey, name: &str) -> Option<String> {
    if let Ok(s) = key.get_value::<String, _>(name) {
        return Some(s);
    }
    if let Ok(n) = key.get_value::<u32, _>(name) {
        return Some(n.to_string());
    }
    key.get_value::<u64, _>(name).ok().map(|n| n.to_string())
}

impl Registry for WindowsRegistry {
    fn value(&self, hive: Hive, path: &str, name: &str) -> Option<String> {
        read(&open(hive, path)?, name)
    }

    fn subkeys(&self, hive: Hive, path: &str) -> Vec<String> {
        match open(hive, path) {
            Some(key) => key.enum_keys().flatten().collect(),
            None => Vec::new(),
        }
    }

    fn values(&self, hive: Hive, path: &str) -> Option<BTreeMap<String, String>> {
        let key = open(hive, path)?;
        let map = key
            .enum_values()
            .flatten()
            .filter_map(|(name, _)| read(&key, &name).map(|v| (name, v)))
            .collect();
        Some(map)
    }
}
