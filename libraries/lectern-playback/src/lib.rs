//! Lectern - Playback Management
//!
//! Platform-agnostic playback engine for chaptered audio (books, lessons).
//!
//! This crate provides:
//! - Chapter/section resolution (pure timestamp → location lookup)
//! - A playback clock whose location is always derived from its time
//! - Transport (play/pause/toggle, end-of-book stop)
//! - Seeking (absolute, relative, percentage, chapter and section jumps)
//! - Playback rate from a fixed recognized set
//! - Volume control (0.0-1.0, logarithmic gain, independent mute)
//! - An async driver owning the tick source and command queue
//!
//! # Architecture
//!
//! `lectern-playback` has no storage or UI dependency. The manager emits
//! [`PlaybackEvent`]s; callers persist preferences and re-render from
//! snapshots after each transition.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use lectern_core::Track;
//! use lectern_playback::{PlaybackManager, PlaybackConfig};
//!
//! let track = Track::builder("book", "A Book", "An Author")
//!     .chapter("One", &[420.0])
//!     .chapter("Two", &[360.0])
//!     .chapter("Three", &[480.0])
//!     .build();
//!
//! let mut manager = PlaybackManager::new(PlaybackConfig::default());
//! manager.load_track(track).unwrap();
//!
//! manager.seek(780.0);
//! assert_eq!(manager.current_chapter_index(), Some(2));
//!
//! manager.play();
//! manager.tick(1.0);
//! assert_eq!(manager.current_time(), 781.0);
//! ```
//!
//! # Example: Driver
//!
//! ```rust,no_run
//! use lectern_core::Track;
//! use lectern_playback::{DriverConfig, PlaybackManager, PlayerDriver};
//!
//! # async fn example(track: Track) -> lectern_playback::Result<()> {
//! let (player, _task) = PlayerDriver::spawn(PlaybackManager::default(), DriverConfig::default());
//!
//! player.load_track(track).await?;
//! player.play().await?;
//!
//! let snapshot = player.current().await?;
//! println!("{} at {:.1}s", snapshot.chapter_progress(), snapshot.current_time);
//! # Ok(())
//! # }
//! ```

mod clock;
#[cfg(feature = "driver")]
mod driver;
mod error;
pub mod events;
mod manager;
mod rate;
pub mod resolver;
pub mod types;
mod volume;

// Public exports
pub use clock::{ClockUpdate, PlaybackClock};
#[cfg(feature = "driver")]
pub use driver::{DriverConfig, PlayerCommand, PlayerDriver, PlayerHandle, DEFAULT_TICK_INTERVAL};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use manager::PlaybackManager;
pub use rate::{PlaybackRate, UnsupportedRate};
pub use resolver::{resolve, Location};
pub use types::{PlaybackConfig, PlaybackSnapshot};
pub use volume::Volume;
