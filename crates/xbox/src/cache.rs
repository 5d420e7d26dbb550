//! Key/value result cache.
//!
//! The Xbox authorization flow writes two keys here once, and every later
//! scan reads them. The file-backed store keeps one JSON document at
//! `<config dir>/gamedeck/cache.json`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use gamedeck_model::dirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CacheError;

/// Owned package family names, a JSON array of strings.
pub const OWNED_KEY: &str = "xbox.owned";

/// Per-PFN metadata table, a JSON object of [`TitleMeta`].
pub const METADATA_KEY: &str = "xbox.metadata";

const CACHE_FILE: &str = "cache.json";

/// Opaque key/value store.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// In-memory cache for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// A cache persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl JsonFileCache {
    /// Opens `<config dir>/gamedeck/cache.json`.
    pub fn open_default() -> Result<Self, CacheError> {
        let dir = dirs::app_config_dir().ok_or(CacheError::NoCacheDir)?;
        Self::open(dir.join(CACHE_FILE))
    }

    /// Opens the cache at `path`. A missing file is an empty cache; a
    /// corrupt one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = load_entries(&path)?;
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, Value>, CacheError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding corrupt result cache");
            Ok(BTreeMap::new())
        }
    }
}

impl ResultCache for JsonFileCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Display metadata for one owned title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The owned set and its metadata table, as stored in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitlements {
    pub owned: Vec<String>,
    pub metadata: BTreeMap<String, TitleMeta>,
}

impl Entitlements {
    /// Reads both keys. Missing or malformed values read as empty.
    pub fn load(cache: &dyn ResultCache) -> Self {
        let owned = cache
            .get(OWNED_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let metadata = cache
            .get(METADATA_KEY)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        Self { owned, metadata }
    }

    pub fn store(&self, cache: &dyn ResultCache) -> Result<(), CacheError> {
        cache.set(OWNED_KEY, serde_json::to_value(&self.owned)?)?;
        cache.set(METADATA_KEY, serde_json::to_value(&self.metadata)?)?;
        Ok(())
    }

    pub fn clear(cache: &dyn ResultCache) -> Result<(), CacheError> {
        cache.remove(OWNED_KEY)?;
        cache.remove(METADATA_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }
}
