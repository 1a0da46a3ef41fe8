//! Playback clock
//!
//! Owns the current time within the loaded track and the location derived
//! from it. The location is recomputed on every time change and cannot be
//! written any other way.

use crate::resolver::{resolve, Location};
use lectern_core::Track;
use std::sync::Arc;

/// Outcome of a clock mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockUpdate {
    /// Derived chapter/section differs from before the mutation
    pub location_changed: bool,

    /// Time reached the end of the track during this mutation
    pub reached_end: bool,
}

/// Current time in a loaded track
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    track: Arc<Track>,
    current_time: f64,
    location: Location,
}

impl PlaybackClock {
    /// Start a clock at the beginning of `track`
    pub fn new(track: Arc<Track>) -> Self {
        let location = resolve(0.0, &track);
        Self {
            track,
            current_time: 0.0,
            location,
        }
    }

    /// Loaded track
    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Derived chapter/section for the current time
    pub fn location(&self) -> Location {
        self.location
    }

    /// Track length in seconds
    pub fn total_duration(&self) -> f64 {
        self.track.total_duration
    }

    /// True once the clock sits on the last instant of the track
    pub fn is_at_end(&self) -> bool {
        self.current_time >= self.total_duration()
    }

    /// Move to `time`, clamped to `[0, total_duration]`
    ///
    /// Non-finite times are ignored.
    pub fn seek(&mut self, time: f64) -> ClockUpdate {
        if !time.is_finite() {
            return ClockUpdate::default();
        }

        let clamped = time.clamp(0.0, self.total_duration());
        self.set_time(clamped)
    }

    /// Advance by `seconds` of track time
    ///
    /// Stops at `total_duration`. Negative or non-finite steps are ignored,
    /// so time never runs backwards through this path.
    pub fn advance(&mut self, seconds: f64) -> ClockUpdate {
        if !seconds.is_finite() || seconds <= 0.0 {
            return ClockUpdate::default();
        }

        let total = self.total_duration();
        let target = self.current_time + seconds;

        if target >= total {
            let mut update = self.set_time(total);
            update.reached_end = true;
            update
        } else {
            self.set_time(target)
        }
    }

    fn set_time(&mut self, time: f64) -> ClockUpdate {
        let previous = self.location;
        self.current_time = time;
        self.location = resolve(time, &self.track);

        ClockUpdate {
            location_changed: previous != self.location,
            reached_end: false,
        }
    }
}
