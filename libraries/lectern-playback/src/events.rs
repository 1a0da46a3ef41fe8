//! Playback Events
//!
//! Event-based communication for UI synchronization and side effects.
//! Events are emitted at key points:
//! - Transport changes (play/pause, end of book)
//! - Track load/unload
//! - Seeks and chapter/section changes
//! - Rate, volume and expansion changes
//!
//! Preference-bearing events convert into a [`PreferencesPatch`] so the
//! caller can persist them after the transition has been applied.

use crate::rate::PlaybackRate;
use lectern_core::{PreferencesPatch, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport started or stopped
    StateChanged {
        /// Whether the clock is now advancing
        is_playing: bool,
    },

    /// A new track replaced whatever was loaded
    TrackLoaded {
        /// ID of the loaded track
        track_id: TrackId,
    },

    /// The player was closed
    TrackUnloaded,

    /// Explicit position change (seek, skip, jump)
    PositionChanged {
        /// New time in seconds
        time: f64,
        /// Chapter containing `time`
        chapter: Option<usize>,
        /// Section containing `time`
        section: Option<usize>,
    },

    /// Derived chapter/section changed (from a seek or from playback)
    ChapterChanged {
        /// New chapter index
        chapter: Option<usize>,
        /// New section index
        section: Option<usize>,
    },

    /// Playback speed changed
    RateChanged {
        /// New rate
        rate: PlaybackRate,
    },

    /// Volume level or mute changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        volume: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Player panel expanded or collapsed
    ExpandedChanged {
        /// Whether the panel is expanded
        is_expanded: bool,
    },

    /// Playback reached the end of the track
    Finished {
        /// ID of the finished track
        track_id: TrackId,
    },
}

impl PlaybackEvent {
    /// Preferences carried by this event, if any
    pub fn preferences_patch(&self) -> Option<PreferencesPatch> {
        match *self {
            PlaybackEvent::VolumeChanged { volume, is_muted } => Some(PreferencesPatch {
                volume: Some(volume),
                is_muted: Some(is_muted),
                is_expanded: None,
            }),
            PlaybackEvent::ExpandedChanged { is_expanded } => {
                Some(PreferencesPatch::expanded(is_expanded))
            }
            _ => None,
        }
    }
}
