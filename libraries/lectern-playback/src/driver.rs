//! Async player driver
//!
//! Runs a [`PlaybackManager`] inside one tokio task. Commands arrive on a
//! bounded channel and are applied in order; the tick source only exists
//! while the manager is playing. Snapshots are published on a `watch`
//! channel and events on a `broadcast` channel.
//!
//! Pausing, reaching the end, closing or replacing the track all drop the
//! interval, and every play creates a fresh one. A tick can therefore never
//! land on a state it was not started for.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    manager::PlaybackManager,
    types::PlaybackSnapshot,
};
use lectern_core::Track;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Default interval between clock ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 64;

/// Commands accepted by the driver task
#[derive(Debug)]
pub enum PlayerCommand {
    /// Load a track, replying with the validation result
    LoadTrack {
        track: Box<Track>,
        reply: oneshot::Sender<Result<()>>,
    },

    /// Unload the track
    Close,

    /// Start or resume playback
    Play,

    /// Pause playback
    Pause,

    /// Toggle play/pause
    Toggle,

    /// Seek to position (in seconds)
    Seek(f64),

    /// Seek relative to the current position (in seconds)
    SkipBy(f64),

    /// Move by a number of chapters
    SkipChapter(isize),

    /// Seek to the start of a chapter
    JumpToChapter(usize),

    /// Seek to the start of a section
    JumpToSection { chapter: usize, section: usize },

    /// Seek to a fraction of the track
    SeekToPercent(f64),

    /// Set playback rate (ignored unless recognized)
    SetRate(f64),

    /// Step to the next recognized rate
    CycleRate,

    /// Set volume (0.0-1.0)
    SetVolume(f32),

    /// Set mute state
    SetMuted(bool),

    /// Toggle mute state
    ToggleMute,

    /// Expand or collapse the player panel
    SetExpanded(bool),

    /// Toggle the player panel
    ToggleExpanded,

    /// Reply with a snapshot taken after every earlier command
    Snapshot(oneshot::Sender<PlaybackSnapshot>),

    /// Stop the driver task
    Shutdown,
}

/// Driver configuration
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Wall-clock time between ticks
    pub tick_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Owns the manager and its tick source
pub struct PlayerDriver {
    manager: PlaybackManager,
    config: DriverConfig,
    commands: mpsc::Receiver<PlayerCommand>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

/// Cheap, cloneable handle for sending commands and observing state
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

/// Periodic tick source, alive only while playing
struct Ticker {
    interval: Interval,
    last: Instant,
}

impl Ticker {
    fn start(period: Duration) -> Self {
        let now = Instant::now();
        let mut interval = tokio::time::interval_at(now + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            interval,
            last: now,
        }
    }

    /// Wait for the next tick; returns seconds elapsed since the previous one
    async fn tick(&mut self) -> f64 {
        let now = self.interval.tick().await;
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f64()
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) -> f64 {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => std::future::pending().await,
    }
}

impl PlayerDriver {
    /// Spawn the driver task on the current tokio runtime
    ///
    /// The task ends on [`PlayerCommand::Shutdown`] or when every handle has
    /// been dropped, and hands the manager back through the join handle.
    pub fn spawn(
        manager: PlaybackManager,
        config: DriverConfig,
    ) -> (PlayerHandle, JoinHandle<PlaybackManager>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(manager.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let driver = Self {
            manager,
            config,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
        };

        let task = tokio::spawn(driver.run());

        let handle = PlayerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_tx,
        };

        (handle, task)
    }

    async fn run(mut self) -> PlaybackManager {
        let mut ticker: Option<Ticker> = None;
        tracing::debug!(tick_ms = self.config.tick_interval.as_millis() as u64, "Player driver started");

        loop {
            tokio::select! {
                // Commands win over ticks so that a command sent before a
                // tick fires is always applied first.
                biased;

                command = self.commands.recv() => {
                    match command {
                        None | Some(PlayerCommand::Shutdown) => break,
                        Some(command) => self.apply(command),
                    }
                }
                elapsed = next_tick(&mut ticker) => {
                    self.manager.tick(elapsed);
                }
            }

            self.sync_ticker(&mut ticker);
            self.publish();
        }

        tracing::debug!("Player driver stopped");
        self.manager
    }

    fn apply(&mut self, command: PlayerCommand) {
        let manager = &mut self.manager;

        match command {
            PlayerCommand::LoadTrack { track, reply } => {
                let result = manager.load_track(*track);
                if let Err(e) = &result {
                    tracing::warn!("Rejected track: {}", e);
                }
                let _ = reply.send(result);
            }
            PlayerCommand::Close => manager.close(),
            PlayerCommand::Play => {
                manager.play();
            }
            PlayerCommand::Pause => {
                manager.pause();
            }
            PlayerCommand::Toggle => {
                manager.toggle();
            }
            PlayerCommand::Seek(time) => manager.seek(time),
            PlayerCommand::SkipBy(seconds) => manager.skip_by(seconds),
            PlayerCommand::SkipChapter(offset) => manager.skip_chapter(offset),
            PlayerCommand::JumpToChapter(index) => {
                manager.jump_to_chapter(index);
            }
            PlayerCommand::JumpToSection { chapter, section } => {
                manager.jump_to_section(chapter, section);
            }
            PlayerCommand::SeekToPercent(percent) => manager.seek_to_percent(percent),
            PlayerCommand::SetRate(rate) => {
                manager.set_playback_rate(rate);
            }
            PlayerCommand::CycleRate => manager.cycle_playback_rate(),
            PlayerCommand::SetVolume(level) => manager.set_volume(level),
            PlayerCommand::SetMuted(muted) => manager.set_muted(muted),
            PlayerCommand::ToggleMute => manager.toggle_mute(),
            PlayerCommand::SetExpanded(expanded) => manager.set_expanded(expanded),
            PlayerCommand::ToggleExpanded => manager.toggle_expanded(),
            PlayerCommand::Snapshot(reply) => {
                let _ = reply.send(manager.snapshot());
            }
            PlayerCommand::Shutdown => {}
        }
    }

    /// Create or drop the tick source to match the transport state
    fn sync_ticker(&self, ticker: &mut Option<Ticker>) {
        match (self.manager.is_playing(), ticker.is_some()) {
            (true, false) => *ticker = Some(Ticker::start(self.config.tick_interval)),
            (false, true) => *ticker = None,
            _ => {}
        }
    }

    fn publish(&mut self) {
        // Receivers may all be gone; that is not an error for the driver
        for event in self.manager.drain_events() {
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.manager.snapshot());
    }
}

impl PlayerHandle {
    /// Queue a command
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::DriverClosed` if the driver task has ended
    pub async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::DriverClosed)
    }

    /// Load a track and wait for validation
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::InvalidCatalog` for a broken catalog, or
    /// `PlaybackError::DriverClosed` if the driver task has ended
    pub async fn load_track(&self, track: Track) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::LoadTrack {
            track: Box::new(track),
            reply,
        })
        .await?;
        rx.await.map_err(|_| PlaybackError::DriverClosed)?
    }

    /// Start or resume playback
    pub async fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play).await
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause).await
    }

    /// Seek to position (in seconds)
    pub async fn seek(&self, time: f64) -> Result<()> {
        self.send(PlayerCommand::Seek(time)).await
    }

    /// Unload the track
    pub async fn close(&self) -> Result<()> {
        self.send(PlayerCommand::Close).await
    }

    /// Snapshot reflecting every command sent before this call
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::DriverClosed` if the driver task has ended
    pub async fn current(&self) -> Result<PlaybackSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| PlaybackError::DriverClosed)
    }

    /// Latest published snapshot (may lag behind queued commands)
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn watch(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Ask the driver task to stop
    pub async fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown).await
    }
}
