mod ids;
mod preferences;
mod track;

pub use ids::{ChapterId, SectionId, TrackId};
pub use preferences::{
    Preferences, PreferencesPatch, PREF_IS_EXPANDED, PREF_IS_MUTED, PREF_VOLUME,
};
pub use track::{Chapter, Section, Track, TrackBuilder, TIME_EPSILON};
