// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Durable client-local key-value storage.
//!
//! The watchlist is the only thing persisted: a JSON array of `icao24`
//! strings under [`WATCHLIST_KEY`]. Reading is tolerant; anything missing,
//! unreadable or malformed loads as an empty watchlist.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

/// Storage key holding the watchlist identifier list.
pub const WATCHLIST_KEY: &str = "flight_tracker_watchlist";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous string key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store, mostly useful for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a single entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store keeping every entry in one JSON object.
///
/// The file is re-read on each access and rewritten atomically (temp file
/// plus rename) on each write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the platform data directory.
    #[must_use]
    pub fn default_path(app_name: &str) -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(app_name).join("storage.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!(
                "Discarding unreadable storage file {}: {}",
                self.path.display(),
                e
            );
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }
}

/// Load the persisted watchlist.
///
/// Missing, unreadable or corrupt storage yields an empty list. Duplicate
/// identifiers are collapsed, keeping the first occurrence.
pub fn load_watchlist<K: KeyValueStore + ?Sized>(store: &K) -> Vec<String> {
    let raw = match store.get(WATCHLIST_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("Failed to read watchlist from storage: {e}");
            return Vec::new();
        }
    };

    let ids: Vec<String> = match serde_json::from_str(&raw) {
        Ok(ids) => ids,
        Err(e) => {
            warn!("Failed to parse stored watchlist, starting empty: {e}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let ids: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    debug!("Loaded {} watchlist entries", ids.len());
    ids
}

/// Persist the watchlist as a JSON array of strings.
pub fn save_watchlist<K: KeyValueStore + ?Sized>(
    store: &mut K,
    ids: &[String],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(ids)?;
    store.set(WATCHLIST_KEY, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_existing_watchlist() {
        let store = MemoryStore::with_entry(WATCHLIST_KEY, r#"["ABC123"]"#);
        assert_eq!(load_watchlist(&store), vec!["ABC123".to_string()]);
    }

    #[test]
    fn test_load_missing_or_corrupt_is_empty() {
        assert!(load_watchlist(&MemoryStore::new()).is_empty());
        assert!(load_watchlist(&MemoryStore::with_entry(WATCHLIST_KEY, "{not json")).is_empty());
        assert!(load_watchlist(&MemoryStore::with_entry(WATCHLIST_KEY, r#"{"a": 1}"#)).is_empty());
        assert!(load_watchlist(&MemoryStore::with_entry(WATCHLIST_KEY, "[1, 2]")).is_empty());
    }

    #[test]
    fn test_load_collapses_duplicates() {
        let store = MemoryStore::with_entry(WATCHLIST_KEY, r#"["b", "a", "b", "c", "a"]"#);
        assert_eq!(load_watchlist(&store), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut store = FileStore::new(&path);
        assert_eq!(store.get(WATCHLIST_KEY).unwrap(), None);

        save_watchlist(&mut store, &["4b1814".to_string(), "a0b1c2".to_string()]).unwrap();
        store.set("other", "value").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(load_watchlist(&reopened), vec!["4b1814", "a0b1c2"]);
        assert_eq!(reopened.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = FileStore::new(&path);
        assert!(store.get(WATCHLIST_KEY).is_err());
        assert!(load_watchlist(&store).is_empty());

        // A write replaces the corrupt contents
        save_watchlist(&mut store, &["abc".to_string()]).unwrap();
        assert_eq!(load_watchlist(&store), vec!["abc"]);
    }
}
