//! Lectern Storage
//!
//! Key-value persistence for playback preferences.
//!
//! Values are stored as JSON under the keys `volume`, `isMuted` and
//! `isExpanded`. Reading never fails: a missing or malformed key falls back
//! to its default. Writing is fire-and-forget from the player's point of
//! view; failures are logged and swallowed.
//!
//! # Example
//!
//! ```rust
//! use lectern_core::PreferencesPatch;
//! use lectern_storage::{MemoryBackend, PreferencesStore};
//!
//! let store = PreferencesStore::new(MemoryBackend::new());
//! store.save(PreferencesPatch::volume(0.4));
//!
//! let prefs = store.load();
//! assert_eq!(prefs.volume, 0.4);
//! assert!(!prefs.is_muted);
//! ```

mod backend;
mod error;
pub mod preferences;

pub use backend::{JsonFileBackend, MemoryBackend, PreferenceBackend};
pub use error::{Result, StorageError};
pub use preferences::PreferencesStore;
