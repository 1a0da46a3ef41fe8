//! Player session
//!
//! Wires a [`PlayerDriver`] to a [`PreferencesStore`]: preferences are read
//! once at startup, and every preference-bearing event is written back after
//! the driver has applied it.

use crate::config::LecternConfig;
use crate::error::Result;
use lectern_core::{Preferences, PreferencesPatch};
use lectern_playback::{
    PlaybackEvent, PlaybackManager, PlaybackSnapshot, PlayerDriver, PlayerHandle,
};
use lectern_storage::{PreferenceBackend, PreferencesStore};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A running player plus its preference writer
pub struct Session {
    player: PlayerHandle,
    driver: JoinHandle<PlaybackManager>,
    persister: JoinHandle<()>,
}

impl Session {
    /// Restore preferences and start the driver
    pub fn start<B>(config: &LecternConfig, store: Arc<PreferencesStore<B>>) -> Self
    where
        B: PreferenceBackend + 'static,
    {
        let preferences = store.load();
        tracing::debug!(?preferences, "Restored preferences");

        let manager = PlaybackManager::new(config.playback_config(preferences));
        let (player, driver) = PlayerDriver::spawn(manager, config.driver_config());

        // Subscribe before any command can be sent
        let events = player.subscribe();
        let persister = tokio::spawn(persist_preferences(events, player.watch(), store));

        Self {
            player,
            driver,
            persister,
        }
    }

    /// Handle for sending commands
    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    /// Stop the driver and flush pending preference writes
    ///
    /// Clones of the handle must be dropped first; the writer runs until the
    /// last one is gone.
    pub async fn finish(self) -> Result<PlaybackManager> {
        let Self {
            player,
            driver,
            persister,
        } = self;

        // An already-stopped driver is fine here
        let _ = player.shutdown().await;
        let manager = driver.await?;

        drop(player);
        persister.await?;

        Ok(manager)
    }
}

async fn persist_preferences<B: PreferenceBackend>(
    mut events: broadcast::Receiver<PlaybackEvent>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    store: Arc<PreferencesStore<B>>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(patch) = event.preferences_patch() {
                    // Small file, written inline to keep writes in event order
                    store.save(patch);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // Dropped events may hold the latest values; the published
                // snapshot is at least as new as any of them.
                tracing::warn!(skipped, "Preference writer fell behind, saving current values");
                let snapshot = snapshots.borrow().clone();
                store.save(PreferencesPatch::from(Preferences {
                    volume: snapshot.volume,
                    is_muted: snapshot.is_muted,
                    is_expanded: snapshot.is_expanded,
                }));
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::debug!("Preference writer stopped");
}
