//! Chapter/section resolution
//!
//! Maps a book timestamp to the chapter and section containing it.
//! Pure: no state, no side effects, never panics.

use lectern_core::Track;
use serde::{Deserialize, Serialize};

/// Derived position of a timestamp within a track
///
/// `None` means "no such unit": the track has no chapters, or the
/// resolved chapter has no sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Chapter index
    pub chapter: Option<usize>,

    /// Section index within the chapter
    pub section: Option<usize>,
}

impl Location {
    /// Location used when nothing is loaded
    pub const NONE: Location = Location {
        chapter: None,
        section: None,
    };
}

/// Resolve `time` to the chapter and section that contain it
///
/// Picks the last chapter whose start is `<= time`, then the last section of
/// that chapter whose start is `<= time`. Consequences:
/// - `time == total_duration` lands on the last section of the last chapter
/// - times before the first chapter land on the first unit
/// - an empty catalog yields [`Location::NONE`]
pub fn resolve(time: f64, track: &Track) -> Location {
    let Some(chapter_index) = last_starting_at_or_before(&track.chapters, time, |c| c.start_time)
    else {
        return Location::NONE;
    };

    let chapter = &track.chapters[chapter_index];
    let section = last_starting_at_or_before(&chapter.sections, time, |s| s.start_time);

    Location {
        chapter: Some(chapter_index),
        section,
    }
}

/// Binary search over units ordered by start time
fn last_starting_at_or_before<T>(units: &[T], time: f64, start: impl Fn(&T) -> f64) -> Option<usize> {
    if units.is_empty() {
        return None;
    }

    // NaN compares false, which puts it before every unit
    let after = units.partition_point(|unit| start(unit) <= time);
    Some(after.saturating_sub(1))
}
