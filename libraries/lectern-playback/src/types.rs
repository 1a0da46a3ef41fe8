//! Core types for playback management

use crate::rate::PlaybackRate;
use lectern_core::{Chapter, Preferences, Section, Track};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for playback manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Preferences restored at startup (default: volume 1.0, unmuted, collapsed)
    pub preferences: Preferences,

    /// Rate every newly loaded track starts at (default: 1x)
    pub default_rate: PlaybackRate,
}

/// Read-only view of the player, handed to presentation code
///
/// Chapter and section indices are always the resolver's output for
/// `current_time`; a snapshot never carries them out of sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// Loaded track, if any
    pub current_track: Option<Arc<Track>>,

    /// Current time in seconds (0 ≤ t ≤ total duration)
    pub current_time: f64,

    /// Whether the clock is advancing
    pub is_playing: bool,

    /// Chapter containing `current_time`
    pub current_chapter_index: Option<usize>,

    /// Section containing `current_time`
    pub current_section_index: Option<usize>,

    /// Volume level (0.0-1.0)
    pub volume: f32,

    /// Mute state
    pub is_muted: bool,

    /// Output gain after mute and logarithmic scaling
    pub effective_gain: f32,

    /// Playback speed
    pub playback_rate: PlaybackRate,

    /// Whether the player panel is expanded
    pub is_expanded: bool,
}

impl PlaybackSnapshot {
    /// Track length, 0 when nothing is loaded
    pub fn total_duration(&self) -> f64 {
        self.current_track
            .as_ref()
            .map_or(0.0, |t| t.total_duration)
    }

    /// Fraction of the track played (0.0-1.0)
    pub fn progress(&self) -> f64 {
        let total = self.total_duration();
        if total > 0.0 {
            (self.current_time / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Seconds left in the track
    pub fn remaining(&self) -> f64 {
        (self.total_duration() - self.current_time).max(0.0)
    }

    /// Chapter containing the current time
    pub fn current_chapter(&self) -> Option<&Chapter> {
        let track = self.current_track.as_ref()?;
        track.chapter(self.current_chapter_index?)
    }

    /// Section containing the current time
    pub fn current_section(&self) -> Option<&Section> {
        let track = self.current_track.as_ref()?;
        track.section(self.current_chapter_index?, self.current_section_index?)
    }

    /// Seconds since the start of the current chapter
    pub fn chapter_elapsed(&self) -> Option<f64> {
        self.current_chapter()
            .map(|c| (self.current_time - c.start_time).max(0.0))
    }

    /// Seconds until the end of the current chapter
    pub fn chapter_remaining(&self) -> Option<f64> {
        self.current_chapter()
            .map(|c| (c.end_time() - self.current_time).max(0.0))
    }

    /// Chapter position label, e.g. "3/15"
    pub fn chapter_progress(&self) -> String {
        let count = self
            .current_track
            .as_ref()
            .map_or(0, |t| t.chapter_count());

        match (self.current_chapter_index, count) {
            (Some(idx), count) if count > 0 => format!("{}/{}", idx + 1, count),
            _ => "No chapters".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_at(time: f64, chapter: Option<usize>, section: Option<usize>) -> PlaybackSnapshot {
        let track = Track::builder("book", "Book", "Author")
            .chapter("One", &[100.0, 100.0])
            .chapter("Two", &[300.0])
            .build();

        PlaybackSnapshot {
            current_track: Some(Arc::new(track)),
            current_time: time,
            is_playing: false,
            current_chapter_index: chapter,
            current_section_index: section,
            volume: 1.0,
            is_muted: false,
            effective_gain: 1.0,
            playback_rate: PlaybackRate::Normal,
            is_expanded: false,
        }
    }

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.default_rate, PlaybackRate::Normal);
        assert_eq!(config.preferences, Preferences::default());
    }

    #[test]
    fn derived_progress_values() {
        let snap = snapshot_at(250.0, Some(1), Some(0));

        assert_eq!(snap.total_duration(), 500.0);
        assert_eq!(snap.progress(), 0.5);
        assert_eq!(snap.remaining(), 250.0);
        assert_eq!(snap.chapter_elapsed(), Some(50.0));
        assert_eq!(snap.chapter_remaining(), Some(250.0));
        assert_eq!(snap.chapter_progress(), "2/2");
        assert_eq!(snap.current_section().unwrap().start_time, 200.0);
    }

    #[test]
    fn empty_snapshot_has_no_chapter() {
        let mut snap = snapshot_at(0.0, None, None);
        snap.current_track = None;

        assert_eq!(snap.progress(), 0.0);
        assert!(snap.current_chapter().is_none());
        assert_eq!(snap.chapter_progress(), "No chapters");
    }
}
