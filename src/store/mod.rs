//! Durable client-side storage seam.
//!
//! The console persists two documents keyed by fixed names: the theme
//! preference and the widget layout map. Both are serialized text with
//! wholesale overwrite on every change and last-writer-wins semantics;
//! concurrent writers are not coordinated.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use crate::error::ConsoleError;

/// Storage key for the persisted theme preference.
pub const THEME_PREF_KEY: &str = "smbgateway-theme";
/// Storage key for the persisted widget layout map.
pub const WIDGET_LAYOUT_KEY: &str = "smbgateway-widget-layouts";

/// Key/value storage over serialized text documents.
///
/// Implementations must not retry or buffer: `put` either lands the full
/// document or fails, and callers decide whether the failure is fatal.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), ConsoleError>;
    fn remove(&mut self, key: &str) -> Result<(), ConsoleError>;
}

/// File-backed store: one JSON document per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ConsoleError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|err| ConsoleError::storage("<root>", format!("create {dir:?}: {err}")))?;
        Ok(Self { dir })
    }

    /// Open the default store, a `.smbgw-console` directory under the
    /// working directory.
    pub fn open_default() -> Result<Self, ConsoleError> {
        let cwd = std::env::current_dir()
            .map_err(|err| ConsoleError::storage("<root>", format!("resolve cwd: {err}")))?;
        Self::open(cwd.join(".smbgw-console"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        let path = self.path_for(key);
        if !path.exists() {
            log::debug!("No saved document for `{key}` at {path:?}");
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .map_err(|err| ConsoleError::storage(key, format!("read {path:?}: {err}")))?;
        Ok(Some(text))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), ConsoleError> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|err| ConsoleError::storage(key, format!("write {path:?}: {err}")))?;
        log::debug!("Saved `{key}` ({} bytes) to {path:?}", value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConsoleError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|err| ConsoleError::storage(key, format!("remove {path:?}: {err}")))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions. Clones share the same
/// map, so a test can hand one clone to an engine and inspect writes through
/// another.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a key, useful for corrupt-document and round-trip tests.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.map.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ConsoleError> {
        Ok(self.map.lock().get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), ConsoleError> {
        self.map.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ConsoleError> {
        self.map.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_documents() {
        let dir = std::env::temp_dir().join(format!("smbgw-store-{}", std::process::id()));
        let mut store = FileStore::open(&dir).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);
        store.put(THEME_PREF_KEY, "{\"active_theme\":\"dark\"}").unwrap();
        assert_eq!(
            store.get(THEME_PREF_KEY).unwrap().as_deref(),
            Some("{\"active_theme\":\"dark\"}")
        );
        store.remove(THEME_PREF_KEY).unwrap();
        assert_eq!(store.get(THEME_PREF_KEY).unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn memory_store_overwrites_wholesale() {
        let mut store = MemoryStore::new();
        store.put("k", "one").unwrap();
        store.put("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }
}
