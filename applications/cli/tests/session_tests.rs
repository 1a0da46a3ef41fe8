//! Session wiring tests on a paused tokio clock

use lectern_cli::{listen, ListenOptions, LecternConfig, Session};
use lectern_core::{Preferences, PreferencesPatch, Track};
use lectern_playback::{PlaybackRate, PlayerCommand};
use lectern_storage::{MemoryBackend, PreferencesStore};
use std::sync::Arc;
use std::time::Duration;

fn memory_store() -> Arc<PreferencesStore<MemoryBackend>> {
    Arc::new(PreferencesStore::new(MemoryBackend::new()))
}

fn lesson() -> Track {
    Track::builder("lesson-7", "Intro to Geometry", "A. Teacher")
        .chapter("Points and Lines", &[120.0, 300.0])
        .chapter("Angles", &[180.0, 180.0])
        .chapter("Triangles", &[160.0, 160.0, 160.0])
        .build()
}

#[tokio::test(start_paused = true)]
async fn test_start_restores_preferences() {
    let store = memory_store();
    store.save(PreferencesPatch::from(Preferences {
        volume: 0.4,
        is_muted: true,
        is_expanded: true,
    }));

    let session = Session::start(&LecternConfig::default(), store.clone());
    let snap = session.player().current().await.unwrap();

    assert_eq!(snap.volume, 0.4);
    assert!(snap.is_muted);
    assert!(snap.is_expanded);

    session.finish().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_preference_changes_are_persisted() {
    let store = memory_store();
    let session = Session::start(&LecternConfig::default(), store.clone());

    let player = session.player();
    player.send(PlayerCommand::SetVolume(0.3)).await.unwrap();
    player.send(PlayerCommand::ToggleMute).await.unwrap();
    player.send(PlayerCommand::SetExpanded(true)).await.unwrap();

    session.finish().await.unwrap();

    assert_eq!(
        store.load(),
        Preferences {
            volume: 0.3,
            is_muted: true,
            is_expanded: true,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_transport_does_not_touch_preferences() {
    let store = memory_store();
    let session = Session::start(&LecternConfig::default(), store.clone());

    let player = session.player();
    player.load_track(lesson()).await.unwrap();
    player.play().await.unwrap();
    player.seek(500.0).await.unwrap();

    session.finish().await.unwrap();

    assert!(store.backend().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_listen_stops_at_end_of_track() {
    let session = Session::start(&LecternConfig::default(), memory_store());
    let short = Track::builder("short", "Short", "Someone")
        .chapter("One", &[1.0])
        .chapter("Two", &[2.0])
        .build();

    let options = ListenOptions {
        duration: Duration::from_secs(60),
        ..Default::default()
    };
    let snap = listen(session.player(), short, options).await.unwrap();

    assert!(!snap.is_playing);
    assert_eq!(snap.current_time, 3.0);
    assert_eq!(snap.current_chapter_index, Some(1));

    session.finish().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_listen_honours_start_and_rate() {
    let session = Session::start(&LecternConfig::default(), memory_store());

    let options = ListenOptions {
        from: 100.0,
        rate: Some(PlaybackRate::Double),
        duration: Duration::from_secs(2),
    };
    let snap = listen(session.player(), lesson(), options).await.unwrap();

    assert!(!snap.is_playing);
    assert_eq!(snap.playback_rate, PlaybackRate::Double);
    assert!(
        (103.0..=104.0).contains(&snap.current_time),
        "expected 103..=104, got {}",
        snap.current_time
    );

    session.finish().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_configured_default_rate_applies_to_loaded_tracks() {
    let mut config = LecternConfig::default();
    config.player.default_rate = 1.5;
    let session = Session::start(&config, memory_store());

    session.player().load_track(lesson()).await.unwrap();
    let snap = session.player().current().await.unwrap();

    assert_eq!(snap.playback_rate, PlaybackRate::OneAndHalf);
    session.finish().await.unwrap();
}
