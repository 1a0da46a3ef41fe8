//! Driver tests on a paused tokio clock
//!
//! Time only moves when every task is idle, so tick counts are exact up to
//! the ordering of timers that fire at the same instant.

use lectern_core::Track;
use lectern_playback::{
    DriverConfig, PlaybackError, PlaybackEvent, PlaybackManager, PlayerCommand, PlayerDriver,
    PlayerHandle,
};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::sleep;

fn lesson() -> Track {
    Track::builder("lesson-7", "Intro to Geometry", "A. Teacher")
        .chapter("Points and Lines", &[120.0, 300.0])
        .chapter("Angles", &[180.0, 180.0])
        .chapter("Triangles", &[160.0, 160.0, 160.0])
        .build()
}

fn spawn() -> (PlayerHandle, JoinHandle<PlaybackManager>) {
    PlayerDriver::spawn(PlaybackManager::default(), DriverConfig::default())
}

async fn spawn_loaded() -> (PlayerHandle, JoinHandle<PlaybackManager>) {
    let (player, task) = spawn();
    player.load_track(lesson()).await.unwrap();
    (player, task)
}

async fn wait_for(
    events: &mut broadcast::Receiver<PlaybackEvent>,
    matches: impl Fn(&PlaybackEvent) -> bool,
) -> PlaybackEvent {
    loop {
        let event = events.recv().await.expect("event channel closed");
        if matches(&event) {
            return event;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_playing_advances_with_wall_time() {
    let (player, _task) = spawn_loaded().await;

    player.play().await.unwrap();
    sleep(Duration::from_secs(1)).await;

    let snap = player.current().await.unwrap();
    assert!(snap.is_playing);
    assert!(
        (0.75..=1.0).contains(&snap.current_time),
        "expected 0.75..=1.0, got {}",
        snap.current_time
    );
}

#[tokio::test(start_paused = true)]
async fn test_seek_after_play_applies_before_next_tick() {
    let (player, _task) = spawn_loaded().await;

    player.play().await.unwrap();
    player.seek(780.0).await.unwrap();

    let snap = player.current().await.unwrap();
    assert!(
        (780.0..780.25).contains(&snap.current_time),
        "seek lost to a tick: {}",
        snap.current_time
    );
    assert_eq!(snap.current_chapter_index, Some(2));
    assert!(snap.is_playing);
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_the_clock() {
    let (player, _task) = spawn_loaded().await;

    player.play().await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    player.pause().await.unwrap();
    let paused_at = player.current().await.unwrap().current_time;

    sleep(Duration::from_secs(10)).await;

    let snap = player.current().await.unwrap();
    assert!(!snap.is_playing);
    assert_eq!(snap.current_time, paused_at);
}

#[tokio::test(start_paused = true)]
async fn test_close_while_playing_stops_ticks() {
    let (player, _task) = spawn_loaded().await;

    player.play().await.unwrap();
    sleep(Duration::from_millis(600)).await;
    player.close().await.unwrap();
    sleep(Duration::from_secs(5)).await;

    let snap = player.current().await.unwrap();
    assert!(snap.current_track.is_none());
    assert!(!snap.is_playing);
    assert_eq!(snap.current_time, 0.0);
    assert_eq!(snap.current_chapter_index, None);
}

#[tokio::test(start_paused = true)]
async fn test_replacing_track_does_not_inherit_ticks() {
    let (player, _task) = spawn_loaded().await;

    player.play().await.unwrap();
    sleep(Duration::from_millis(600)).await;
    player.load_track(lesson()).await.unwrap();
    sleep(Duration::from_secs(5)).await;

    let snap = player.current().await.unwrap();
    assert!(!snap.is_playing);
    assert_eq!(snap.current_time, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_track_is_rejected() {
    let (player, _task) = spawn_loaded().await;
    player.seek(100.0).await.unwrap();

    let mut broken = lesson();
    broken.total_duration = 1300.0;

    let result = player.load_track(broken).await;
    assert!(matches!(result, Err(PlaybackError::InvalidCatalog(_))));

    let snap = player.current().await.unwrap();
    assert_eq!(snap.current_time, 100.0);
    assert_eq!(snap.current_track.unwrap().id.as_str(), "lesson-7");
}

#[tokio::test(start_paused = true)]
async fn test_rate_scales_tick_advance() {
    let (player, _task) = spawn_loaded().await;

    player.send(PlayerCommand::SetRate(2.0)).await.unwrap();
    player.play().await.unwrap();
    sleep(Duration::from_secs(1)).await;

    let snap = player.current().await.unwrap();
    assert!(
        (1.5..=2.0).contains(&snap.current_time),
        "expected 1.5..=2.0, got {}",
        snap.current_time
    );
}

#[tokio::test(start_paused = true)]
async fn test_end_of_book_finishes_and_stops() {
    let (player, _task) = spawn();
    let short = Track::builder("short", "Short", "Someone")
        .chapter("Only", &[2.0])
        .build();
    player.load_track(short).await.unwrap();
    let mut events = player.subscribe();

    player.play().await.unwrap();

    let finished = wait_for(&mut events, |e| matches!(e, PlaybackEvent::Finished { .. })).await;
    assert_eq!(
        finished,
        PlaybackEvent::Finished {
            track_id: "short".into()
        }
    );

    sleep(Duration::from_secs(3)).await;
    let snap = player.current().await.unwrap();
    assert!(!snap.is_playing);
    assert_eq!(snap.current_time, 2.0);
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_commands() {
    let (player, _task) = spawn_loaded().await;
    let mut events = player.subscribe();

    player.send(PlayerCommand::SetVolume(0.5)).await.unwrap();
    player.send(PlayerCommand::ToggleExpanded).await.unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        PlaybackEvent::VolumeChanged {
            volume: 0.5,
            is_muted: false
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        PlaybackEvent::ExpandedChanged { is_expanded: true }
    );
}

#[tokio::test(start_paused = true)]
async fn test_watch_sees_published_snapshot() {
    let (player, _task) = spawn_loaded().await;
    let mut watch = player.watch();
    let _ = watch.borrow_and_update();

    player.send(PlayerCommand::JumpToChapter(1)).await.unwrap();
    watch.changed().await.unwrap();

    let snap = watch.borrow().clone();
    assert_eq!(snap.current_time, 420.0);
    assert_eq!(snap.current_chapter_index, Some(1));
    assert_eq!(player.snapshot(), snap);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_returns_manager() {
    let (player, task) = spawn_loaded().await;
    player.seek(300.0).await.unwrap();
    player.shutdown().await.unwrap();

    let manager = task.await.unwrap();
    assert_eq!(manager.current_time(), 300.0);

    assert!(matches!(
        player.play().await,
        Err(PlaybackError::DriverClosed)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handles_ends_driver() {
    let (player, task) = spawn_loaded().await;
    let second = player.clone();

    drop(player);
    second.play().await.unwrap();
    drop(second);

    let manager = task.await.unwrap();
    assert!(manager.is_playing());
}
