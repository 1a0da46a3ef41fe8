//! Lectern Core
//!
//! Platform-agnostic catalog types, preferences and error handling for Lectern.
//!
//! The core crate defines:
//! - **Catalog Types**: `Track`, `Chapter`, `Section` and their ids
//! - **Preferences**: volume, mute and expansion state that outlives a track
//! - **Error Handling**: unified `LecternError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lectern_core::Track;
//!
//! let track = Track::builder("book-1", "A Short Book", "Someone")
//!     .chapter("Opening", &[120.0, 300.0])
//!     .chapter("Closing", &[360.0])
//!     .build();
//!
//! assert_eq!(track.total_duration, 780.0);
//! assert!(track.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod time;
pub mod types;

pub use error::{LecternError, Result};
pub use time::format_timestamp;
pub use types::{
    Chapter, ChapterId, Preferences, PreferencesPatch, Section, SectionId, Track, TrackBuilder,
    TrackId,
};
