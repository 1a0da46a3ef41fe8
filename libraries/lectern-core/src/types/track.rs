//! Track catalog: a book split into chapters, each split into sections.
//!
//! All times are seconds from the start of the book, stored as `f64`.
//! The JSON form uses camelCase keys (`totalDuration`, `startTime`, ...).

use crate::error::{LecternError, Result};
use crate::types::{ChapterId, SectionId, TrackId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tolerance used when comparing catalog boundaries (1 ms)
pub const TIME_EPSILON: f64 = 0.001;

/// A complete audio book or lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Author or narrator
    pub author: String,

    /// Sum of all chapter durations, in seconds
    pub total_duration: f64,

    /// Chapters ordered by start time
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// A named, time-bounded subdivision of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Unique chapter identifier
    pub id: ChapterId,
    /// Chapter title
    pub title: String,
    /// Offset from the start of the track, in seconds
    pub start_time: f64,
    /// Length in seconds
    pub duration: f64,

    /// Sections partitioning this chapter
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Smallest addressable unit of time within a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Unique section identifier
    pub id: SectionId,
    /// Section title
    pub title: String,
    /// Offset from the start of the track, in seconds
    pub start_time: f64,
    /// Length in seconds
    pub duration: f64,
}

impl Section {
    /// End of the section (exclusive)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Check if a time falls inside `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}

impl Chapter {
    /// End of the chapter (exclusive)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Check if a time falls inside `[start, end)`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}

impl Track {
    /// Start building a track from chapter and section durations
    pub fn builder(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> TrackBuilder {
        TrackBuilder {
            id: TrackId::new(id),
            title: title.into(),
            author: author.into(),
            chapters: Vec::new(),
        }
    }

    /// Parse a catalog from JSON, validate it and align its boundaries
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str::<Track>(json)?.validated()
    }

    /// Read a catalog file from disk, validate it and align its boundaries
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Number of chapters
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Get a chapter by index
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Get a section by chapter and section index
    pub fn section(&self, chapter: usize, section: usize) -> Option<&Section> {
        self.chapters.get(chapter)?.sections.get(section)
    }

    /// Check every timing invariant of the catalog
    ///
    /// - all times finite, durations positive
    /// - first chapter starts at 0
    /// - chapters are contiguous and sum to `total_duration`
    /// - sections (when present) exactly cover their chapter
    /// - every unit keeps a non-empty range once boundaries are aligned
    ///
    /// Boundaries may be off by up to [`TIME_EPSILON`].
    ///
    /// # Errors
    ///
    /// Returns `LecternError::InvalidCatalog` describing the first violation found
    pub fn validate(&self) -> Result<()> {
        if !self.total_duration.is_finite() || self.total_duration < 0.0 {
            return Err(LecternError::invalid_catalog(format!(
                "track {} has invalid total duration {}",
                self.id, self.total_duration
            )));
        }

        let mut expected_start = 0.0;
        let mut sum = 0.0;

        for chapter in &self.chapters {
            check_span(
                &format!("chapter {}", chapter.id),
                chapter.start_time,
                chapter.duration,
                expected_start,
            )?;
            validate_sections(chapter)?;

            expected_start = chapter.end_time();
            sum += chapter.duration;
        }

        if (sum - self.total_duration).abs() > TIME_EPSILON {
            return Err(LecternError::invalid_catalog(format!(
                "track {} declares total duration {} but chapters sum to {}",
                self.id, self.total_duration, sum
            )));
        }

        for (chapter, (start, end)) in self.chapters.iter().zip(self.chapter_bounds()) {
            check_range(&format!("chapter {}", chapter.id), start, end)?;

            let sections = section_bounds(chapter, start, end);
            for (section, (start, end)) in chapter.sections.iter().zip(sections) {
                check_range(
                    &format!("section {} of chapter {}", section.id, chapter.id),
                    start,
                    end,
                )?;
            }
        }

        Ok(())
    }

    /// Validate, then move every boundary onto exact contiguity
    ///
    /// The first chapter starts at exactly 0, each later chapter keeps its
    /// start and the one before it is stretched or shrunk to end there.
    /// Sections are aligned the same way inside their chapter, and
    /// `total_duration` becomes the end of the last chapter. Afterwards each
    /// unit's `[start, end)` is the range a timestamp lookup assigns to it.
    ///
    /// # Errors
    ///
    /// Returns `LecternError::InvalidCatalog` if [`Track::validate`] fails
    pub fn validated(mut self) -> Result<Self> {
        self.validate()?;
        self.align_boundaries();
        Ok(self)
    }

    fn align_boundaries(&mut self) {
        let bounds = self.chapter_bounds();

        for (chapter, (start, end)) in self.chapters.iter_mut().zip(bounds) {
            let sections = section_bounds(chapter, start, end);
            chapter.start_time = start;
            chapter.duration = end - start;

            for (section, (start, end)) in chapter.sections.iter_mut().zip(sections) {
                section.start_time = start;
                section.duration = end - start;
            }
        }

        self.total_duration = self.chapters.last().map_or(0.0, Chapter::end_time);
    }

    fn chapter_bounds(&self) -> Vec<(f64, f64)> {
        let end = self.chapters.last().map_or(0.0, Chapter::end_time);
        ranges(0.0, self.chapters.iter().map(|c| c.start_time), end)
    }
}

fn section_bounds(chapter: &Chapter, start: f64, end: f64) -> Vec<(f64, f64)> {
    ranges(start, chapter.sections.iter().map(|s| s.start_time), end)
}

/// `[start, end)` pairs where each unit runs until the next one starts
///
/// The first unit is pinned to `origin` and the last runs to `end`.
fn ranges(origin: f64, starts: impl Iterator<Item = f64>, end: f64) -> Vec<(f64, f64)> {
    let mut points: Vec<f64> = starts.collect();
    let Some(first) = points.first_mut() else {
        return Vec::new();
    };

    *first = origin;
    points.push(end);
    points.windows(2).map(|w| (w[0], w[1])).collect()
}

fn validate_sections(chapter: &Chapter) -> Result<()> {
    if chapter.sections.is_empty() {
        return Ok(());
    }

    let mut expected_start = chapter.start_time;
    for section in &chapter.sections {
        check_span(
            &format!("section {} of chapter {}", section.id, chapter.id),
            section.start_time,
            section.duration,
            expected_start,
        )?;
        expected_start = section.end_time();
    }

    if (expected_start - chapter.end_time()).abs() > TIME_EPSILON {
        return Err(LecternError::invalid_catalog(format!(
            "sections of chapter {} end at {} but the chapter ends at {}",
            chapter.id,
            expected_start,
            chapter.end_time()
        )));
    }

    Ok(())
}

fn check_span(label: &str, start: f64, duration: f64, expected_start: f64) -> Result<()> {
    if !start.is_finite() || !duration.is_finite() || duration < 0.0 {
        return Err(LecternError::invalid_catalog(format!(
            "{label} has invalid timing (start {start}, duration {duration})"
        )));
    }

    if duration <= 0.0 {
        return Err(LecternError::invalid_catalog(format!(
            "{label} has zero length at {start}"
        )));
    }

    if (start - expected_start).abs() > TIME_EPSILON {
        let kind = if start > expected_start { "gap" } else { "overlap" };
        return Err(LecternError::invalid_catalog(format!(
            "{label} starts at {start}, expected {expected_start} ({kind})"
        )));
    }

    Ok(())
}

// A unit shorter than the boundary drift around it would never be resolved
fn check_range(label: &str, start: f64, end: f64) -> Result<()> {
    if end <= start {
        return Err(LecternError::invalid_catalog(format!(
            "{label} has zero length once aligned to [{start}, {end})"
        )));
    }
    Ok(())
}

/// Builds a contiguous track from durations, computing every start time
#[derive(Debug, Clone)]
pub struct TrackBuilder {
    id: TrackId,
    title: String,
    author: String,
    chapters: Vec<Chapter>,
}

impl TrackBuilder {
    /// Append a chapter made of sections with the given durations
    ///
    /// An empty `section_durations` produces a zero-length chapter, which
    /// [`Track::validate`] rejects; use [`TrackBuilder::chapter_without_sections`]
    /// for a chapter that has length but no subdivisions.
    pub fn chapter(mut self, title: impl Into<String>, section_durations: &[f64]) -> Self {
        let chapter_index = self.chapters.len();
        let start_time = self.next_start();

        let mut sections = Vec::with_capacity(section_durations.len());
        let mut section_start = start_time;
        for (i, &duration) in section_durations.iter().enumerate() {
            sections.push(Section {
                id: SectionId::new(format!("{}-c{}-s{}", self.id, chapter_index, i)),
                title: format!("Section {}", i + 1),
                start_time: section_start,
                duration,
            });
            section_start += duration;
        }

        self.chapters.push(Chapter {
            id: ChapterId::new(format!("{}-c{}", self.id, chapter_index)),
            title: title.into(),
            start_time,
            duration: section_durations.iter().sum(),
            sections,
        });
        self
    }

    /// Append a chapter with no sections
    pub fn chapter_without_sections(mut self, title: impl Into<String>, duration: f64) -> Self {
        let chapter_index = self.chapters.len();
        let start_time = self.next_start();

        self.chapters.push(Chapter {
            id: ChapterId::new(format!("{}-c{}", self.id, chapter_index)),
            title: title.into(),
            start_time,
            duration,
            sections: Vec::new(),
        });
        self
    }

    /// Finish the track; total duration is the sum of chapter durations
    pub fn build(self) -> Track {
        Track {
            id: self.id,
            title: self.title,
            author: self.author,
            total_duration: self.chapters.iter().map(|c| c.duration).sum(),
            chapters: self.chapters,
        }
    }

    fn next_start(&self) -> f64 {
        self.chapters.last().map_or(0.0, Chapter::end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Track {
        Track::builder("book", "A Book", "An Author")
            .chapter("Intro", &[120.0, 300.0])
            .chapter("Middle", &[360.0])
            .chapter("End", &[200.0, 200.0, 80.0])
            .build()
    }

    #[test]
    fn builder_produces_contiguous_catalog() {
        let track = sample_track();

        assert_eq!(track.total_duration, 1260.0);
        assert_eq!(track.chapters[1].start_time, 420.0);
        assert_eq!(track.chapters[2].start_time, 780.0);
        assert_eq!(track.chapters[2].sections[2].start_time, 1180.0);
        assert!(track.validate().is_ok());
    }

    #[test]
    fn empty_track_is_valid() {
        let track = Track::builder("empty", "Nothing", "Nobody").build();
        assert_eq!(track.total_duration, 0.0);
        assert!(track.validate().is_ok());
    }

    #[test]
    fn chapter_without_sections_is_valid() {
        let track = Track::builder("b", "t", "a")
            .chapter_without_sections("Only", 90.0)
            .build();
        assert!(track.validate().is_ok());
        assert!(track.chapters[0].sections.is_empty());
    }

    #[test]
    fn detects_gap_between_chapters() {
        let mut track = sample_track();
        track.chapters[1].start_time += 5.0;

        let err = track.validate().unwrap_err();
        assert!(err.to_string().contains("gap"), "unexpected error: {err}");
    }

    #[test]
    fn detects_overlap_between_sections() {
        let mut track = sample_track();
        track.chapters[0].sections[1].start_time -= 10.0;

        let err = track.validate().unwrap_err();
        assert!(err.to_string().contains("overlap"), "unexpected error: {err}");
    }

    #[test]
    fn detects_total_duration_mismatch() {
        let mut track = sample_track();
        track.total_duration = 1300.0;

        assert!(matches!(
            track.validate(),
            Err(LecternError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn detects_sections_not_covering_chapter() {
        let mut track = sample_track();
        track.chapters[1].sections[0].duration = 300.0;

        assert!(track.validate().is_err());
    }

    #[test]
    fn rejects_negative_duration() {
        let mut track = sample_track();
        track.chapters[0].sections[0].duration = -1.0;

        assert!(track.validate().is_err());
    }

    #[test]
    fn tolerates_sub_millisecond_drift() {
        let mut track = sample_track();
        track.chapters[1].start_time += 0.0004;
        track.chapters[1].sections[0].start_time += 0.0004;

        assert!(track.validate().is_ok());
    }

    #[test]
    fn rejects_zero_length_chapter() {
        let json = r#"{
            "id": "z", "title": "z", "author": "z", "totalDuration": 200,
            "chapters": [
                { "id": "a", "title": "A", "startTime": 0, "duration": 100 },
                { "id": "b", "title": "B", "startTime": 100, "duration": 0 },
                { "id": "c", "title": "C", "startTime": 100, "duration": 100 }
            ]
        }"#;

        let err = Track::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("chapter b has zero length"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_zero_length_section() {
        let mut track = sample_track();
        track.chapters[2].sections.insert(
            1,
            Section {
                id: SectionId::new("empty"),
                title: "Empty".into(),
                start_time: 980.0,
                duration: 0.0,
            },
        );

        let err = track.validate().unwrap_err();
        assert!(err.to_string().contains("zero length"), "unexpected error: {err}");
    }

    #[test]
    fn rejects_unit_swallowed_by_drift() {
        let mut track = Track::builder("b", "t", "a")
            .chapter_without_sections("A", 100.0)
            .chapter_without_sections("B", 0.0005)
            .chapter_without_sections("C", 100.0)
            .build();
        // B starts late by 0.8 ms and C starts right where B does
        track.chapters[1].start_time = 100.0008;
        track.chapters[2].start_time = 100.0008;

        let err = track.validate().unwrap_err();
        assert!(err.to_string().contains("once aligned"), "unexpected error: {err}");
    }

    #[test]
    fn validated_closes_sub_millisecond_gaps() {
        let json = r#"{
            "id": "g", "title": "g", "author": "g", "totalDuration": 200,
            "chapters": [
                { "id": "a", "title": "A", "startTime": 0, "duration": 100,
                  "sections": [
                      { "id": "a1", "title": "A1", "startTime": 0.0004, "duration": 50 },
                      { "id": "a2", "title": "A2", "startTime": 50.0001, "duration": 49.9999 }
                  ] },
                { "id": "b", "title": "B", "startTime": 100.0009, "duration": 99.9991 }
            ]
        }"#;

        let track = Track::from_json_str(json).unwrap();
        let [a, b] = &track.chapters[..] else {
            panic!("expected two chapters");
        };

        assert_eq!(a.start_time, 0.0);
        assert_eq!(a.end_time(), b.start_time);
        assert!(a.contains(100.0005));
        assert!(!b.contains(100.0005));

        assert_eq!(a.sections[0].start_time, 0.0);
        assert_eq!(a.sections[0].end_time(), a.sections[1].start_time);
        assert_eq!(a.sections[1].end_time(), a.end_time());

        assert_eq!(track.total_duration, b.end_time());
    }

    #[test]
    fn parses_camel_case_json() {
        let json = r#"{
            "id": "lesson-1",
            "title": "Lesson One",
            "author": "Teacher",
            "totalDuration": 100,
            "chapters": [
                {
                    "id": "c1",
                    "title": "Only chapter",
                    "startTime": 0,
                    "duration": 100,
                    "sections": [
                        { "id": "s1", "title": "First", "startTime": 0, "duration": 40 },
                        { "id": "s2", "title": "Second", "startTime": 40, "duration": 60 }
                    ]
                }
            ]
        }"#;

        let track = Track::from_json_str(json).unwrap();
        assert_eq!(track.id.as_str(), "lesson-1");
        assert_eq!(track.section(0, 1).unwrap().title, "Second");
    }

    #[test]
    fn json_with_broken_invariant_is_rejected() {
        let json = r#"{
            "id": "x", "title": "x", "author": "x", "totalDuration": 50,
            "chapters": [{ "id": "c", "title": "c", "startTime": 0, "duration": 40 }]
        }"#;

        assert!(matches!(
            Track::from_json_str(json),
            Err(LecternError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            Track::from_json_str("{ not json"),
            Err(LecternError::Serialization(_))
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, serde_json::to_string(&sample_track()).unwrap()).unwrap();

        let loaded = Track::load(&path).unwrap();
        assert_eq!(loaded, sample_track());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Track::load(dir.path().join("missing.json")),
            Err(LecternError::Io(_))
        ));
    }
}
