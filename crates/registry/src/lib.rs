//! Read-only key lookups over the OS configuration store.
//!
//! Every scanner that needs the Windows registry goes through the
//! [`Registry`] trait, so all value decoding lives in one place. Lookups
//! never fail: a missing key, a missing value, or an unsupported value
//! type are all reported as absent.

pub mod memory;
pub mod uninstall;
#[cfg(windows)]
mod windows;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use memory::MemoryRegistry;
pub use uninstall::{UninstallEntry, uninstall_entries, uninstall_entry};

/// Registry root a lookup starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

/// Narrow key/value lookup over the registry.
pub trait Registry: Send + Sync {
    /// Returns a single value rendered as a string.
    ///
    /// String values are returned verbatim, DWORD/QWORD values in decimal.
    fn value(&self, hive: Hive, path: &str, name: &str) -> Option<String>;

    /// Returns the names of the direct subkeys of `path`.
    fn subkeys(&self, hive: Hive, path: &str) -> Vec<String>;

    /// Returns every value of a key, or `None` if the key does not exist.
    fn values(&self, hive: Hive, path: &str) -> Option<BTreeMap<String, String>>;

    /// Returns the first non-empty value found across `locations`.
    fn first_value(&self, locations: &[(Hive, &str, &str)]) -> Option<String> {
        locations.iter().find_map(|(hive, path, name)| {
            self.value(*hive, path, name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }
}

/// Returns the registry of the running system.
///
/// On non-Windows hosts this is an empty [`MemoryRegistry`].
pub fn system() -> Arc<dyn Registry> {
    #[cfg(windows)]
    {
        Arc::new(windows::WindowsRegistry)
    }

    #[cfg(not(windows))]
    {
        Arc::new(MemoryRegistry::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_skips_blank_and_missing() {
        let reg = MemoryRegistry::new()
            .with_value(Hive::LocalMachine, r"SOFTWARE\A", "Path", "   ")
            .with_value(Hive::CurrentUser, r"SOFTWARE\B", "Path", r"D:\Games");

        let found = reg.first_value(&[
            (Hive::LocalMachine, r"SOFTWARE\Missing", "Path"),
            (Hive::LocalMachine, r"SOFTWARE\A", "Path"),
            (Hive::CurrentUser, r"SOFTWARE\B", "Path"),
        ]);
        assert_eq!(found.as_deref(), Some(r"D:\Games"));
    }

    #[test]
    fn system_registry_is_usable() {
        let reg = system();
        // Must not panic regardless of host.
        let _ = reg.subkeys(Hive::LocalMachine, r"SOFTWARE\gamedeck-test-missing");
    }
}
