//! Durable storage for the session store.
//!
//! A `Persister` pairs a serializer and deserializer for [`UserState`] with a
//! [`StateStorage`] backend. The record is a JSON envelope stored under a
//! single fixed key:
//!
//! ```json
//! { "state": { "user": { ... } | null }, "version": 0 }
//! ```
//!
//! Loading never fails: a missing, unreadable or malformed record yields an
//! empty state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::UserState;

/// Storage key for the session record.
pub const STORAGE_KEY: &str = "user-storage";

/// Envelope version. Records written with any other version are ignored.
pub const STATE_VERSION: u32 = 0;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A key/value text store. Implementations must make a completed `write`
/// visible to every later `read`, including from a freshly constructed
/// backend pointing at the same place.
pub trait StateStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================================================
// File Storage
// ============================================================================

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::Io { path, source })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        // Write a sibling file and rename it over the record, so a crash
        // mid-write leaves the previous record intact
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

// ============================================================================
// Memory Storage
// ============================================================================

/// In-process storage. Clones share the same map, so a store rebuilt from a
/// clone sees what an earlier store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw record, bypassing serialization.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert_raw(key, value);
        Ok(())
    }
}

// ============================================================================
// Persister
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    state: UserState,
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

pub struct Persister {
    storage: Box<dyn StateStorage>,
    key: String,
}

impl Persister {
    pub fn new(storage: impl StateStorage + 'static) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: impl StateStorage + 'static, key: impl Into<String>) -> Self {
        Self {
            storage: Box::new(storage),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Restore state from storage, treating anything unusable as logged out.
    pub fn load(&self) -> UserState {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No persisted state");
                return UserState::default();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted state");
                return UserState::default();
            }
        };

        match decode(&raw) {
            Some(state) => state,
            None => {
                warn!(key = %self.key, "Ignoring malformed persisted state");
                UserState::default()
            }
        }
    }

    pub fn save(&self, state: &UserState) -> Result<(), StorageError> {
        let contents = encode(state)?;
        self.storage.write(&self.key, &contents)?;
        debug!(key = %self.key, logged_in = state.user.is_some(), "Persisted state");
        Ok(())
    }
}

/// Serialize a state into its storage envelope.
pub fn encode(state: &UserState) -> Result<String, StorageError> {
    let envelope = PersistedState {
        state: state.clone(),
        version: STATE_VERSION,
        saved_at: Some(Utc::now()),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse a storage envelope. `None` for anything malformed or from another version.
pub fn decode(raw: &str) -> Option<UserState> {
    let envelope: PersistedState = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!(error = %e, "Failed to parse persisted state");
            return None;
        }
    };
    if envelope.version != STATE_VERSION {
        debug!(version = envelope.version, "Unsupported persisted state version");
        return None;
    }
    debug!(saved_at = ?envelope.saved_at, "Decoded persisted state");
    Some(envelope.state)
}

// ============================================================================
// Tests
// ============================================================================
