//! Playback manager - core orchestration
//!
//! Coordinates the clock, transport state, rate, volume and expansion.
//! Every command applies its state transition synchronously and queues
//! events; persistence and rendering happen outside, from those events.

use crate::{
    clock::{ClockUpdate, PlaybackClock},
    error::Result,
    events::PlaybackEvent,
    rate::PlaybackRate,
    resolver::Location,
    types::{PlaybackConfig, PlaybackSnapshot},
    volume::Volume,
};
use lectern_core::{Preferences, Track};
use std::sync::Arc;

/// Central playback management
///
/// Orchestrates all playback functionality:
/// - Transport (play/pause/toggle, end-of-book stop)
/// - Seeking (absolute, relative, percentage, chapter and section jumps)
/// - Playback rate (fixed recognized set)
/// - Volume control (0.0-1.0, independent mute)
/// - Player expansion state
///
/// Without a loaded track, transport and rate commands do nothing. Volume,
/// mute and expansion are preferences and apply at any time.
pub struct PlaybackManager {
    // State
    clock: Option<PlaybackClock>,
    is_playing: bool,

    // Settings
    playback_rate: PlaybackRate,
    default_rate: PlaybackRate,
    volume: Volume,
    is_expanded: bool,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackManager {
    /// Create new playback manager
    pub fn new(config: PlaybackConfig) -> Self {
        let mut volume = Volume::new(config.preferences.volume);
        volume.set_muted(config.preferences.is_muted);

        Self {
            clock: None,
            is_playing: false,
            playback_rate: config.default_rate,
            default_rate: config.default_rate,
            volume,
            is_expanded: config.preferences.is_expanded,
            pending_events: Vec::new(),
        }
    }

    // ===== Track Lifecycle =====

    /// Load a track, replacing any current one
    ///
    /// Playback state restarts: time 0, paused, default rate. Preferences
    /// are kept. Boundaries are aligned on load (see [`Track::validated`]),
    /// so the snapshot's track may differ from `track` by under a millisecond.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidCatalog` if the track breaks a timing
    /// invariant; the current state is left untouched in that case.
    pub fn load_track(&mut self, track: Track) -> Result<()> {
        let track = track.validated()?;

        let track_id = track.id.clone();
        tracing::debug!(track_id = %track_id, chapters = track.chapter_count(), "Loading track");

        self.reset_transport();
        self.clock = Some(PlaybackClock::new(Arc::new(track)));
        self.pending_events.push(PlaybackEvent::TrackLoaded { track_id });
        self.emit_location();

        Ok(())
    }

    /// Close the player
    ///
    /// Unloads the track and resets playback state. Preferences are kept.
    pub fn close(&mut self) {
        if self.clock.is_none() {
            return;
        }

        self.reset_transport();
        self.clock = None;
        self.pending_events.push(PlaybackEvent::TrackUnloaded);
    }

    fn reset_transport(&mut self) {
        if self.is_playing {
            self.is_playing = false;
            self.emit_state_changed();
        }
        if self.playback_rate != self.default_rate {
            self.playback_rate = self.default_rate;
            self.pending_events.push(PlaybackEvent::RateChanged {
                rate: self.playback_rate,
            });
        }
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// Returns `true` if the transport changed. Starting from the very end
    /// of the track restarts it from the beginning. No-op without a track
    /// or with an empty track.
    pub fn play(&mut self) -> bool {
        if self.is_playing {
            return false;
        }

        let Some(clock) = self.clock.as_mut() else {
            tracing::debug!("Ignoring play: no track loaded");
            return false;
        };

        if clock.total_duration() <= 0.0 {
            tracing::debug!("Ignoring play: track has no duration");
            return false;
        }

        if clock.is_at_end() {
            let update = clock.seek(0.0);
            self.after_seek(update);
        }

        self.is_playing = true;
        self.emit_state_changed();
        true
    }

    /// Pause playback
    ///
    /// Returns `true` if the transport changed.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing {
            return false;
        }

        self.is_playing = false;
        self.emit_state_changed();
        true
    }

    /// Toggle between playing and paused
    pub fn toggle(&mut self) -> bool {
        if self.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Advance the clock by `elapsed` seconds of wall time
    ///
    /// Track time advances by `elapsed * rate`. Reaching the end clamps to
    /// the total duration and stops playback. No-op while paused.
    pub fn tick(&mut self, elapsed: f64) {
        if !self.is_playing {
            return;
        }

        let rate = self.playback_rate.value();
        let Some(clock) = self.clock.as_mut() else {
            return;
        };

        let update = clock.advance(elapsed * rate);

        if update.location_changed {
            self.emit_location();
        }

        if update.reached_end {
            self.is_playing = false;
            self.emit_state_changed();
            if let Some(track) = self.current_track() {
                let track_id = track.id.clone();
                tracing::debug!(track_id = %track_id, "Reached end of track");
                self.pending_events.push(PlaybackEvent::Finished { track_id });
            }
        }
    }

    // ===== Seeking =====

    /// Seek to `time` seconds, clamped to the track
    pub fn seek(&mut self, time: f64) {
        let Some(clock) = self.clock.as_mut() else {
            tracing::debug!("Ignoring seek: no track loaded");
            return;
        };

        if !time.is_finite() {
            return;
        }

        let update = clock.seek(time);
        self.after_seek(update);
    }

    /// Seek relative to the current time (e.g. -15 / +30 jump buttons)
    pub fn skip_by(&mut self, seconds: f64) {
        if let Some(now) = self.clock.as_ref().map(PlaybackClock::current_time) {
            self.seek(now + seconds);
        }
    }

    /// Seek to a fraction of the track (clamped to 0.0-1.0)
    pub fn seek_to_percent(&mut self, percent: f64) {
        if !percent.is_finite() {
            return;
        }

        if let Some(total) = self.clock.as_ref().map(PlaybackClock::total_duration) {
            self.seek(total * percent.clamp(0.0, 1.0));
        }
    }

    /// Move `offset` chapters from the current one and seek to its start
    ///
    /// The target is clamped to the first/last chapter; there is no
    /// wraparound. No-op without chapters.
    pub fn skip_chapter(&mut self, offset: isize) {
        let Some(clock) = self.clock.as_ref() else {
            return;
        };

        let count = clock.track().chapter_count();
        let Some(current) = clock.location().chapter else {
            return;
        };

        let last = count.saturating_sub(1);
        let target = current.saturating_add_signed(offset).min(last);
        let start = clock.track().chapters[target].start_time;
        self.seek(start);
    }

    /// Seek to the start of the next chapter (stays on the last chapter)
    pub fn next_chapter(&mut self) {
        self.skip_chapter(1);
    }

    /// Seek to the start of the previous chapter (stays on the first chapter)
    pub fn previous_chapter(&mut self) {
        self.skip_chapter(-1);
    }

    /// Seek to the start of chapter `index`
    ///
    /// Returns `false` (and does nothing) for an unknown chapter.
    pub fn jump_to_chapter(&mut self, index: usize) -> bool {
        let start = self
            .current_track()
            .and_then(|t| t.chapter(index))
            .map(|c| c.start_time);

        match start {
            Some(start) => {
                self.seek(start);
                true
            }
            None => false,
        }
    }

    /// Seek to the start of section `section` of chapter `chapter`
    ///
    /// Returns `false` (and does nothing) for an unknown section.
    pub fn jump_to_section(&mut self, chapter: usize, section: usize) -> bool {
        let start = self
            .current_track()
            .and_then(|t| t.section(chapter, section))
            .map(|s| s.start_time);

        match start {
            Some(start) => {
                self.seek(start);
                true
            }
            None => false,
        }
    }

    fn after_seek(&mut self, update: ClockUpdate) {
        let Some(clock) = self.clock.as_ref() else {
            return;
        };

        let location = clock.location();
        self.pending_events.push(PlaybackEvent::PositionChanged {
            time: clock.current_time(),
            chapter: location.chapter,
            section: location.section,
        });

        if update.location_changed {
            self.emit_location();
        }
    }

    // ===== Rate =====

    /// Set playback rate
    ///
    /// Only recognized rates are accepted (see [`PlaybackRate::ALL`]); any
    /// other value is ignored. Returns `true` if the rate was accepted.
    pub fn set_playback_rate(&mut self, rate: f64) -> bool {
        if self.clock.is_none() {
            tracing::debug!("Ignoring rate change: no track loaded");
            return false;
        }

        let Some(rate) = PlaybackRate::from_value(rate) else {
            tracing::debug!(rate, "Ignoring unsupported playback rate");
            return false;
        };

        if rate != self.playback_rate {
            self.playback_rate = rate;
            self.pending_events.push(PlaybackEvent::RateChanged { rate });
        }
        true
    }

    /// Step to the next recognized rate, wrapping to the slowest
    pub fn cycle_playback_rate(&mut self) {
        let next = self.playback_rate.next();
        self.set_playback_rate(next.value());
    }

    // ===== Volume =====

    /// Set volume (clamped to 0.0-1.0)
    ///
    /// Does not unmute. Non-finite values are ignored.
    pub fn set_volume(&mut self, level: f32) {
        let before = self.volume.level();
        if self.volume.set_level(level) && self.volume.level() != before {
            self.emit_volume_changed();
        }
    }

    /// Set mute state
    pub fn set_muted(&mut self, muted: bool) {
        if self.volume.is_muted() != muted {
            self.volume.set_muted(muted);
            self.emit_volume_changed();
        }
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.emit_volume_changed();
    }

    // ===== Expansion =====

    /// Expand or collapse the player panel
    pub fn set_expanded(&mut self, expanded: bool) {
        if self.is_expanded != expanded {
            self.is_expanded = expanded;
            self.pending_events.push(PlaybackEvent::ExpandedChanged {
                is_expanded: expanded,
            });
        }
    }

    /// Toggle the player panel
    pub fn toggle_expanded(&mut self) {
        self.set_expanded(!self.is_expanded);
    }

    // ===== Preferences =====

    /// Current persisted-preference values
    pub fn preferences(&self) -> Preferences {
        Preferences {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            is_expanded: self.is_expanded,
        }
    }

    /// Apply preferences restored from storage
    pub fn apply_preferences(&mut self, prefs: Preferences) {
        self.set_volume(prefs.volume);
        self.set_muted(prefs.is_muted);
        self.set_expanded(prefs.is_expanded);
    }

    // ===== State Queries =====

    /// Get current track
    pub fn current_track(&self) -> Option<&Arc<Track>> {
        self.clock.as_ref().map(PlaybackClock::track)
    }

    /// Whether the clock is advancing
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Current time in seconds (0 with no track)
    pub fn current_time(&self) -> f64 {
        self.clock.as_ref().map_or(0.0, PlaybackClock::current_time)
    }

    /// Derived chapter/section for the current time
    pub fn location(&self) -> Location {
        self.clock
            .as_ref()
            .map_or(Location::NONE, PlaybackClock::location)
    }

    /// Current chapter index
    pub fn current_chapter_index(&self) -> Option<usize> {
        self.location().chapter
    }

    /// Current section index
    pub fn current_section_index(&self) -> Option<usize> {
        self.location().section
    }

    /// Current playback rate
    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    /// Current volume level (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Whether the player panel is expanded
    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    /// Read-only copy of the full player state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let location = self.location();

        PlaybackSnapshot {
            current_track: self.current_track().cloned(),
            current_time: self.current_time(),
            is_playing: self.is_playing,
            current_chapter_index: location.chapter,
            current_section_index: location.section,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            effective_gain: self.volume.gain(),
            playback_rate: self.playback_rate,
            is_expanded: self.is_expanded,
        }
    }

    // ===== Events =====

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit_state_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::StateChanged {
            is_playing: self.is_playing,
        });
    }

    fn emit_location(&mut self) {
        let location = self.location();
        self.pending_events.push(PlaybackEvent::ChapterChanged {
            chapter: location.chapter,
            section: location.section,
        });
    }

    fn emit_volume_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }
}

impl Default for PlaybackManager {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}
