//! Playback preferences store
//!
//! Reads and writes [`Preferences`] through a [`PreferenceBackend`], one key
//! per field. Loading falls back to the default for each key that is
//! absent, unreadable or of the wrong type.

use crate::backend::PreferenceBackend;
use crate::error::Result;
use lectern_core::types::{PREF_IS_EXPANDED, PREF_IS_MUTED, PREF_VOLUME};
use lectern_core::{Preferences, PreferencesPatch};
use serde_json::Value;

/// Preferences persisted through a key-value backend
#[derive(Debug)]
pub struct PreferencesStore<B> {
    backend: B,
}

impl<B: PreferenceBackend> PreferencesStore<B> {
    /// Wrap a backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read all preferences
    ///
    /// Never fails: each key falls back to its default independently.
    /// An out-of-range volume is clamped to `[0, 1]`.
    pub fn load(&self) -> Preferences {
        let defaults = Preferences::default();

        let volume = self
            .read(PREF_VOLUME)
            .and_then(|value| parse_volume(&value))
            .unwrap_or(defaults.volume);

        let is_muted = self
            .read(PREF_IS_MUTED)
            .and_then(|value| parse_flag(PREF_IS_MUTED, &value))
            .unwrap_or(defaults.is_muted);

        let is_expanded = self
            .read(PREF_IS_EXPANDED)
            .and_then(|value| parse_flag(PREF_IS_EXPANDED, &value))
            .unwrap_or(defaults.is_expanded);

        Preferences {
            volume,
            is_muted,
            is_expanded,
        }
    }

    /// Persist the keys set in `patch`, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the backend error for the first key that could not be written
    pub fn try_save(&self, patch: PreferencesPatch) -> Result<()> {
        if let Some(volume) = patch.volume {
            self.backend.set(PREF_VOLUME, volume_value(volume))?;
        }
        if let Some(is_muted) = patch.is_muted {
            self.backend.set(PREF_IS_MUTED, Value::Bool(is_muted))?;
        }
        if let Some(is_expanded) = patch.is_expanded {
            self.backend.set(PREF_IS_EXPANDED, Value::Bool(is_expanded))?;
        }
        Ok(())
    }

    /// Persist the keys set in `patch`
    ///
    /// Fire-and-forget: a failing backend is logged and otherwise ignored so
    /// that playback never depends on storage.
    pub fn save(&self, patch: PreferencesPatch) {
        if patch.is_empty() {
            return;
        }

        if let Err(e) = self.try_save(patch) {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }

    fn read(&self, key: &str) -> Option<Value> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Failed to read preference, using default: {}", e);
                None
            }
        }
    }
}

// Shortest decimal form, so 0.3 is stored as 0.3 and not 0.30000001192092896
fn volume_value(volume: f32) -> Value {
    let volume = volume
        .to_string()
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(volume));
    Value::from(volume)
}

fn parse_volume(value: &Value) -> Option<f32> {
    match value.as_f64() {
        Some(volume) if volume.is_finite() => Some(volume.clamp(0.0, 1.0) as f32),
        _ => {
            tracing::warn!(key = PREF_VOLUME, %value, "Malformed preference, using default");
            None
        }
    }
}

fn parse_flag(key: &str, value: &Value) -> Option<bool> {
    let flag = value.as_bool();
    if flag.is_none() {
        tracing::warn!(key, %value, "Malformed preference, using default");
    }
    flag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use serde_json::json;

    fn store_with(entries: &[(&str, Value)]) -> PreferencesStore<MemoryBackend> {
        let backend = MemoryBackend::new();
        for (key, value) in entries {
            backend.set(key, value.clone()).unwrap();
        }
        PreferencesStore::new(backend)
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = store_with(&[]);
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn valid_values_are_loaded() {
        let store = store_with(&[
            ("volume", json!(0.3)),
            ("isMuted", json!(true)),
            ("isExpanded", json!(true)),
        ]);

        let prefs = store.load();
        assert_eq!(prefs.volume, 0.3);
        assert!(prefs.is_muted);
        assert!(prefs.is_expanded);
    }

    #[test]
    fn malformed_keys_fall_back_independently() {
        let store = store_with(&[
            ("volume", json!("loud")),
            ("isMuted", json!(true)),
            ("isExpanded", json!(1)),
        ]);

        let prefs = store.load();
        assert_eq!(prefs.volume, 1.0);
        assert!(prefs.is_muted);
        assert!(!prefs.is_expanded);
    }

    #[test]
    fn out_of_range_volume_is_clamped() {
        assert_eq!(store_with(&[("volume", json!(4))]).load().volume, 1.0);
        assert_eq!(store_with(&[("volume", json!(-0.5))]).load().volume, 0.0);
    }

    #[test]
    fn save_writes_only_provided_keys() {
        let store = store_with(&[("isExpanded", json!(true))]);

        store.save(PreferencesPatch::muted(true));

        assert_eq!(store.backend().len(), 2);
        assert_eq!(store.backend().get("volume").unwrap(), None);
        assert!(store.load().is_expanded);
    }
}
