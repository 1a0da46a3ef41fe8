//! Human-readable catalog output

use lectern_core::{format_timestamp, Track};
use lectern_playback::{resolve, PlaybackSnapshot};
use std::fmt;

/// Chapter and section listing with start/end timestamps
pub fn describe_track(track: &Track) -> String {
    Listing(track).to_string()
}

struct Listing<'a>(&'a Track);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let track = self.0;

        writeln!(f, "{} by {}", track.title, track.author)?;
        writeln!(
            f,
            "{} chapters, {}",
            track.chapter_count(),
            format_timestamp(track.total_duration)
        )?;

        for (i, chapter) in track.chapters.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {} [{} - {}]",
                i + 1,
                chapter.title,
                format_timestamp(chapter.start_time),
                format_timestamp(chapter.end_time())
            )?;

            for (j, section) in chapter.sections.iter().enumerate() {
                writeln!(
                    f,
                    "       {}.{} {} [{} - {}]",
                    i + 1,
                    j + 1,
                    section.title,
                    format_timestamp(section.start_time),
                    format_timestamp(section.end_time())
                )?;
            }
        }

        Ok(())
    }
}

/// The chapter and section containing `time`
pub fn describe_location(track: &Track, time: f64) -> String {
    let location = resolve(time, track);

    let Some(chapter_index) = location.chapter else {
        return format!("{}: no chapters", format_timestamp(time));
    };

    let chapter = &track.chapters[chapter_index];
    let head = format!(
        "{}: chapter {}/{} \"{}\"",
        format_timestamp(time),
        chapter_index + 1,
        track.chapter_count(),
        chapter.title
    );

    let section = location
        .section
        .and_then(|s| Some((s, track.section(chapter_index, s)?)));

    match section {
        Some((section_index, section)) => format!(
            "{head}, section {}/{} \"{}\" [{} - {}]",
            section_index + 1,
            chapter.sections.len(),
            section.title,
            format_timestamp(section.start_time),
            format_timestamp(section.end_time())
        ),
        None => head,
    }
}

/// One-line player status
pub fn describe_snapshot(snapshot: &PlaybackSnapshot) -> String {
    let state = if snapshot.is_playing { "playing" } else { "paused" };
    let chapter = snapshot
        .current_chapter()
        .map_or("-", |chapter| chapter.title.as_str());

    format!(
        "[{}] {} / {} | chapter {} \"{}\" | {}",
        state,
        format_timestamp(snapshot.current_time),
        format_timestamp(snapshot.total_duration()),
        snapshot.chapter_progress(),
        chapter,
        snapshot.playback_rate
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> Track {
        Track::builder("lesson-7", "Intro to Geometry", "A. Teacher")
            .chapter("Points and Lines", &[120.0, 300.0])
            .chapter("Angles", &[180.0, 180.0])
            .chapter("Triangles", &[160.0, 160.0, 160.0])
            .build()
    }

    #[test]
    fn listing_has_every_unit() {
        let text = describe_track(&lesson());

        assert!(text.starts_with("Intro to Geometry by A. Teacher\n3 chapters, 21:00\n"));
        assert!(text.contains("  2. Angles [7:00 - 13:00]"));
        assert!(text.contains("3.3 Section 3 [18:20 - 21:00]"));
        assert_eq!(text.lines().count(), 2 + 3 + 7);
    }

    #[test]
    fn location_names_chapter_and_section() {
        let text = describe_location(&lesson(), 780.0);
        assert!(text.starts_with("13:00: chapter 3/3 \"Triangles\", section 1/3"));
    }

    #[test]
    fn end_of_track_is_last_section() {
        let text = describe_location(&lesson(), 1260.0);
        assert!(text.contains("section 3/3"));
    }

    #[test]
    fn status_line() {
        let mut manager = lectern_playback::PlaybackManager::default();
        manager.load_track(lesson()).unwrap();
        manager.seek(500.0);

        assert_eq!(
            describe_snapshot(&manager.snapshot()),
            "[paused] 8:20 / 21:00 | chapter 2/3 \"Angles\" | 1x"
        );
    }

    #[test]
    fn empty_track_has_no_chapters() {
        let empty = Track::builder("e", "Empty", "Nobody").build();
        assert_eq!(describe_location(&empty, 0.0), "0:00: no chapters");
    }
}
