//! Simulated listening through the driver

use crate::error::Result;
use lectern_core::Track;
use lectern_playback::{
    PlaybackEvent, PlaybackRate, PlaybackSnapshot, PlayerCommand, PlayerHandle,
};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// What to play and for how long
#[derive(Debug, Clone, Copy)]
pub struct ListenOptions {
    /// Start position in seconds
    pub from: f64,

    /// Speed override; the configured default when `None`
    pub rate: Option<PlaybackRate>,

    /// Wall-clock time to keep playing
    pub duration: Duration,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            from: 0.0,
            rate: None,
            duration: Duration::from_secs(10),
        }
    }
}

/// Load `track`, play it for `options.duration` or until it ends, then pause
///
/// Chapter changes are logged as they happen. Returns the final snapshot.
pub async fn listen(
    player: &PlayerHandle,
    track: Track,
    options: ListenOptions,
) -> Result<PlaybackSnapshot> {
    let mut events = player.subscribe();

    player.load_track(track).await?;
    if options.from > 0.0 {
        player.seek(options.from).await?;
    }
    if let Some(rate) = options.rate {
        player.send(PlayerCommand::SetRate(rate.value())).await?;
    }

    let start = player.current().await?;
    let Some(track) = start.current_track.clone() else {
        return Ok(start);
    };
    tracing::info!(
        title = %track.title,
        from = start.current_time,
        rate = %start.playback_rate,
        "Starting playback"
    );

    player.play().await?;

    let deadline = tokio::time::sleep(options.duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = events.recv() => match event {
                Ok(PlaybackEvent::ChapterChanged { chapter: Some(chapter), section }) => {
                    let title = track.chapter(chapter).map_or("?", |c| c.title.as_str());
                    tracing::info!(
                        chapter = chapter + 1,
                        section = section.map(|s| s + 1),
                        "Now in \"{}\"",
                        title
                    );
                }
                Ok(PlaybackEvent::Finished { track_id }) => {
                    tracing::info!(%track_id, "Reached the end");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed playback events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    player.pause().await?;
    Ok(player.current().await?)
}
