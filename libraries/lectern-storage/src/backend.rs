//! Key-value backends for preferences
//!
//! Values are arbitrary JSON. A backend only knows keys; interpreting the
//! values is the store's job.

use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A persistent key-value store holding JSON values
pub trait PreferenceBackend: Send + Sync {
    /// Read a key
    ///
    /// Returns `Ok(None)` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write a key, replacing any previous value
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

impl<B: PreferenceBackend + ?Sized> PreferenceBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<B: PreferenceBackend + ?Sized> PreferenceBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Values are replaced whole, so a panicked writer cannot leave them torn
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local backend; contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        lock(&self.values).is_empty()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }
}

/// Backend storing every key in one JSON object file
///
/// A missing file reads as empty. A file that is not a JSON object is
/// treated as empty (with a warning) and replaced on the next write.
/// Writes go to a sibling temp file which is then renamed over the target.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileBackend {
    /// Use the file at `path` (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "Preferences file is not a JSON object, ignoring it");
                Ok(Map::new())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Corrupt preferences file, ignoring it: {}", e);
                Ok(Map::new())
            }
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let json = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = lock(&self.write_lock);

        let mut map = self.read_all()?;
        map.insert(key.to_string(), value);
        self.write_all(&map)?;

        tracing::trace!(path = %self.path.display(), key, "Stored preference");
        Ok(())
    }
}
