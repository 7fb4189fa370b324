//! Key-value persistence for settings and the session count.
//!
//! The engine never talks to storage. The host mirrors two logical keys:
//!
//! - [`SETTINGS_KEY`]: JSON object `{"work":25,"shortBreak":5,"longBreak":15}`
//! - [`SESSION_COUNT_KEY`]: the completed work session count as a decimal string
//!
//! Reads are forgiving: anything missing or malformed is treated as absent and
//! replaced by defaults. Writes are fire-and-forget; callers log failures.

use crate::models::TimerConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::sync::Mutex;
use thiserror::Error;

/// Key of the persisted duration settings.
pub const SETTINGS_KEY: &str = "settings";

/// Key of the persisted completed-session count.
pub const SESSION_COUNT_KEY: &str = "sessionCount";

/// File name of the [`FileStore`] document inside the data directory.
pub const STORE_FILE_NAME: &str = "store.json";

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode store document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// External string-to-string store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store, used for tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON document in the data directory.
///
/// The document is read once on open and rewritten in full on every `set`,
/// via a temporary file and a rename so a crash never leaves half a document.
#[derive(Debug)]
pub struct FileStore {
    path: Utf8PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store in `dir`.
    ///
    /// A corrupt document is logged and treated as empty.
    pub fn open<P: AsRef<Utf8Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let path = dir.join(STORE_FILE_NAME);
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            parse_document(&path, &contents)
        } else {
            BTreeMap::new()
        };

        tracing::info!("Opened store at {} ({} keys)", path, entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let document = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, document).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }
}

/// Accept string values as-is and keep other JSON values as their text.
fn parse_document(path: &Utf8Path, contents: &str) -> BTreeMap<String, String> {
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(contents) {
        Ok(map) => map
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Store document {} is corrupt, starting empty: {}", path, e);
            BTreeMap::new()
        }
    }
}

/// Read the persisted durations, falling back per field to the defaults.
pub fn load_settings(store: &dyn KeyValueStore) -> TimerConfig {
    match store.get(SETTINGS_KEY) {
        Ok(Some(raw)) => TimerConfig::from_json_lenient(&raw),
        Ok(None) => TimerConfig::default(),
        Err(e) => {
            tracing::warn!("Could not read settings, using defaults: {}", e);
            TimerConfig::default()
        }
    }
}

/// Read the persisted session count; missing or malformed values yield 0.
pub fn load_session_count(store: &dyn KeyValueStore) -> u64 {
    match store.get(SESSION_COUNT_KEY) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring malformed session count '{}'", raw);
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!("Could not read session count, starting from 0: {}", e);
            0
        }
    }
}

pub fn save_settings(store: &dyn KeyValueStore, config: &TimerConfig) -> Result<(), StorageError> {
    let value = serde_json::to_string(config)?;
    store.set(SETTINGS_KEY, &value)
}

pub fn save_session_count(store: &dyn KeyValueStore, count: u64) -> Result<(), StorageError> {
    store.set(SESSION_COUNT_KEY, &count.to_string())
}
