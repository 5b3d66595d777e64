//! Playback Controller
//!
//! Explicit state machine for one session. Owns the session queue and the
//! session's engine, counts back-to-back failures and runs the bounded
//! advance loop. Every method runs on the session lane, so nothing here
//! locks.
//!
//! | From | Event | To |
//! |---|---|---|
//! | Idle | play (queue non-empty) | Starting → Playing |
//! | Playing/Paused/Stopping | engine finished | Starting → Playing, or Idle |
//! | Playing/Paused | skip | Stopping |
//! | Playing | pause | Paused |
//! | Paused | resume | Playing |
//! | any | stop | Idle |
//! | any | play now | Starting → Playing |

use super::lane::SessionCommand;
use super::queue::SessionQueue;
use super::relay::CompletionRelay;
use super::{
    EnqueueOutcome, MoveOutcome, PlayNowOutcome, QueueSnapshot, SessionSettings, StartOutcome,
    StopOutcome, VolumeOutcome,
};
use crate::engine::PlaybackEngine;
use crate::error::{CommandError, EngineError};
use crate::ingest::IngestBatch;
use jukebox_common::events::{
    EventBus, Placement, PlaybackState, QueueChangeTrigger, SessionEvent,
};
use jukebox_common::{SessionId, Track};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// State machine for one session
pub struct PlaybackController {
    session_id: SessionId,
    queue: SessionQueue,
    state: PlaybackState,

    /// Token of the engine start whose completion is still expected
    play_token: Option<Uuid>,

    engine: Arc<dyn PlaybackEngine>,
    events: Arc<EventBus>,

    /// The lane's own mailbox, handed to engines inside each relay
    lane_tx: mpsc::UnboundedSender<SessionCommand>,

    max_consecutive_errors: u32,
}

impl PlaybackController {
    pub(crate) fn new(
        session_id: SessionId,
        engine: Arc<dyn PlaybackEngine>,
        events: Arc<EventBus>,
        settings: SessionSettings,
        lane_tx: mpsc::UnboundedSender<SessionCommand>,
    ) -> Self {
        Self {
            session_id,
            queue: SessionQueue::new(settings.default_volume.clamp(0.0, 1.0)),
            state: PlaybackState::Idle,
            play_token: None,
            engine,
            events,
            lane_tx,
            max_consecutive_errors: settings.max_consecutive_errors.max(1),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Manual start from Idle
    ///
    /// Resets the error counter before advancing.
    pub async fn request_play(&mut self) -> StartOutcome {
        if self.state.is_active() {
            return StartOutcome::AlreadyActive { state: self.state };
        }
        if self.queue.is_empty() {
            return StartOutcome::QueueEmpty;
        }
        self.queue.reset_error_count();
        self.advance().await
    }

    /// Insert an ingested batch, starting playback if the session is idle
    pub async fn enqueue(&mut self, batch: IngestBatch, placement: Placement) -> EnqueueOutcome {
        let report = batch.insert(&mut self.queue, placement);
        info!(
            "Session {}: queued {} track(s) at {:?} (pending {})",
            self.session_id,
            report.added,
            placement,
            self.queue.len()
        );
        self.emit_queue_changed(QueueChangeTrigger::UserEnqueue);

        let playback = if self.state == PlaybackState::Idle {
            Some(self.request_play().await)
        } else {
            None
        };
        EnqueueOutcome { report, playback }
    }

    /// Replace whatever is playing with the first track of `batch`
    ///
    /// The rest of the batch goes to the head of the queue in order.
    pub async fn play_now(&mut self, batch: IngestBatch) -> Result<PlayNowOutcome, CommandError> {
        let was_limited = batch.was_limited();
        let total_count = batch.total_count();
        let (requested, rest) = batch.split_first().ok_or(CommandError::NoTracksFound)?;

        if self.state.is_active() || self.engine.is_active() {
            // Forget the token first so the stop's completion is stale
            self.play_token = None;
            if let Some(interrupted) = self.queue.take_current() {
                info!(
                    "Session {}: interrupting '{}' for play-now",
                    self.session_id,
                    interrupted.title()
                );
            }
            if let Err(e) = self.engine.stop().await {
                error!("Session {}: failed to stop engine: {}", self.session_id, e);
            }
        }

        let queued = rest.len();
        if queued > 0 {
            rest.insert(&mut self.queue, Placement::Head);
            self.emit_queue_changed(QueueChangeTrigger::UserEnqueue);
        }

        self.queue.reset_error_count();
        let playback = match self.start_track(requested.clone()).await {
            Ok(track) => StartOutcome::Started { track },
            Err(_) => self.advance().await,
        };

        Ok(PlayNowOutcome {
            requested,
            queued,
            was_limited,
            total_count,
            playback,
        })
    }

    /// Stop the active track; its completion drives the advance
    pub async fn skip(&mut self) -> Result<Track, CommandError> {
        if !matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            return Err(CommandError::EmptyQueue);
        }
        let current = self.queue.current().cloned().ok_or(CommandError::EmptyQueue)?;

        let previous = self.state;
        self.transition(PlaybackState::Stopping);
        if let Err(e) = self.engine.stop().await {
            error!("Session {}: skip failed: {}", self.session_id, e);
            self.transition(previous);
            return Err(e.into());
        }
        info!("Session {}: skipped '{}'", self.session_id, current.title());
        Ok(current)
    }

    pub async fn pause(&mut self) -> Result<Track, CommandError> {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => return Err(CommandError::AlreadyPaused),
            _ => return Err(CommandError::EmptyQueue),
        }
        let current = self.queue.current().cloned().ok_or(CommandError::EmptyQueue)?;

        self.engine.pause().await.map_err(|e| {
            error!("Session {}: pause failed: {}", self.session_id, e);
            CommandError::from(e)
        })?;
        self.transition(PlaybackState::Paused);
        Ok(current)
    }

    pub async fn resume(&mut self) -> Result<Track, CommandError> {
        match self.state {
            PlaybackState::Paused => {}
            PlaybackState::Playing => return Err(CommandError::NotPaused),
            _ => return Err(CommandError::EmptyQueue),
        }
        let current = self.queue.current().cloned().ok_or(CommandError::EmptyQueue)?;

        self.engine.resume().await.map_err(|e| {
            error!("Session {}: resume failed: {}", self.session_id, e);
            CommandError::from(e)
        })?;
        self.transition(PlaybackState::Playing);
        Ok(current)
    }

    /// Clear everything and go Idle
    pub async fn stop(&mut self) -> StopOutcome {
        let cleared = self.queue.len();
        let was_playing = self.state.is_active();

        self.queue.clear_pending();
        self.queue.take_current();
        self.play_token = None;

        if was_playing || self.engine.is_active() {
            if let Err(e) = self.engine.stop().await {
                error!("Session {}: failed to stop engine: {}", self.session_id, e);
            }
        }
        self.transition(PlaybackState::Idle);
        if cleared > 0 {
            self.emit_queue_changed(QueueChangeTrigger::UserClear);
        }

        info!(
            "Session {}: stopped, cleared {} pending track(s)",
            self.session_id, cleared
        );
        StopOutcome {
            cleared,
            was_playing,
        }
    }

    /// Handle the engine's end-of-track report
    pub async fn engine_finished(&mut self, play_id: Uuid, outcome: Result<(), EngineError>) {
        if self.play_token != Some(play_id) {
            debug!(
                "Session {}: ignoring stale completion {}",
                self.session_id, play_id
            );
            return;
        }
        self.play_token = None;
        let finished = self.queue.take_current();

        match outcome {
            Ok(()) => {
                self.queue.reset_error_count();
                if let Some(track) = &finished {
                    debug!("Session {}: finished '{}'", self.session_id, track.title());
                }
            }
            Err(e) => {
                let count = self.queue.increment_error_count();
                warn!(
                    "Session {}: playback error ({}/{}): {}",
                    self.session_id, count, self.max_consecutive_errors, e
                );
                if let Some(track) = &finished {
                    self.emit_track_failed(track, &e, count);
                }
            }
        }

        self.advance().await;
    }

    // ========================================================================
    // Advance
    // ========================================================================

    /// Bounded advance loop
    ///
    /// A rejected start counts as a failure, so an endlessly failing queue
    /// stops after `max_consecutive_errors` attempts.
    async fn advance(&mut self) -> StartOutcome {
        loop {
            if self.queue.error_count() >= self.max_consecutive_errors {
                return self.halt();
            }

            let Some(track) = self.queue.dequeue_next() else {
                self.transition(PlaybackState::Idle);
                info!("Session {}: queue finished", self.session_id);
                self.events.emit_lossy(SessionEvent::QueueFinished {
                    session_id: self.session_id.clone(),
                    timestamp: chrono::Utc::now(),
                });
                return StartOutcome::QueueEmpty;
            };
            self.emit_queue_changed(QueueChangeTrigger::TrackAdvance);

            if let Ok(track) = self.start_track(track).await {
                return StartOutcome::Started { track };
            }
        }
    }

    /// Start `track` on the engine under a fresh play token
    ///
    /// On rejection the failure is already counted and reported.
    async fn start_track(&mut self, track: Track) -> Result<Track, EngineError> {
        let play_id = Uuid::new_v4();
        self.play_token = Some(play_id);
        self.queue.set_current(track.clone());
        self.transition(PlaybackState::Starting);

        let relay = CompletionRelay::new(play_id, self.lane_tx.clone());
        match self
            .engine
            .start(track.source_ref(), self.queue.volume(), relay)
            .await
        {
            Ok(()) => {
                self.transition(PlaybackState::Playing);
                info!("Session {}: now playing '{}'", self.session_id, track.title());
                self.events.emit_lossy(SessionEvent::TrackStarted {
                    session_id: self.session_id.clone(),
                    track: track.clone(),
                    timestamp: chrono::Utc::now(),
                });
                Ok(track)
            }
            Err(e) => {
                self.play_token = None;
                self.queue.take_current();
                let count = self.queue.increment_error_count();
                warn!(
                    "Session {}: could not start '{}' ({}/{}): {}",
                    self.session_id,
                    track.title(),
                    count,
                    self.max_consecutive_errors,
                    e
                );
                self.emit_track_failed(&track, &e, count);
                Err(e)
            }
        }
    }

    fn halt(&mut self) -> StartOutcome {
        let consecutive_errors = self.queue.error_count();
        warn!(
            "Session {}: halting playback after {} consecutive errors ({} pending)",
            self.session_id,
            consecutive_errors,
            self.queue.len()
        );

        self.play_token = None;
        self.queue.take_current();
        self.transition(PlaybackState::Idle);
        self.queue.reset_error_count();

        self.events.emit_lossy(SessionEvent::PlaybackHalted {
            session_id: self.session_id.clone(),
            consecutive_errors,
            pending: self.queue.len(),
            timestamp: chrono::Utc::now(),
        });
        StartOutcome::Halted { consecutive_errors }
    }

    // ========================================================================
    // Queue editing
    // ========================================================================

    /// Drop every pending track; the current one keeps playing
    pub fn clear(&mut self) -> usize {
        let cleared = self.queue.len();
        self.queue.clear_pending();
        if cleared > 0 {
            self.emit_queue_changed(QueueChangeTrigger::UserClear);
        }
        cleared
    }

    pub fn shuffle(&mut self) -> Result<usize, CommandError> {
        match self.queue.len() {
            0 => return Err(CommandError::EmptyQueue),
            1 => return Err(CommandError::NothingToShuffle),
            _ => {}
        }
        let mut tracks = self.queue.peek_all();
        tracks.shuffle(&mut rand::thread_rng());
        let len = tracks.len();
        self.queue.replace(tracks);
        self.emit_queue_changed(QueueChangeTrigger::UserReorder);
        Ok(len)
    }

    /// Move the track at 1-based `from` to 1-based `to`
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<MoveOutcome, CommandError> {
        let len = self.queue.len();
        if len == 0 {
            return Err(CommandError::EmptyQueue);
        }
        for position in [from, to] {
            if position == 0 || position > len {
                return Err(CommandError::InvalidPosition { position, len });
            }
        }
        if from == to {
            return Err(CommandError::SamePosition { position: from });
        }

        let mut tracks = self.queue.peek_all();
        let track = tracks.remove(from - 1);
        tracks.insert(to - 1, track.clone());
        self.queue.replace(tracks);
        self.emit_queue_changed(QueueChangeTrigger::UserReorder);

        Ok(MoveOutcome { track, from, to })
    }

    /// Remove the track at 1-based `position`
    pub fn remove(&mut self, position: usize) -> Result<Track, CommandError> {
        let len = self.queue.len();
        if len == 0 {
            return Err(CommandError::EmptyQueue);
        }
        if position == 0 || position > len {
            return Err(CommandError::InvalidPosition { position, len });
        }

        let mut tracks = self.queue.peek_all();
        let removed = tracks.remove(position - 1);
        self.queue.replace(tracks);
        self.emit_queue_changed(QueueChangeTrigger::UserDequeue);
        Ok(removed)
    }

    // ========================================================================
    // Volume and queries
    // ========================================================================

    pub async fn set_volume(&mut self, percent: u32) -> Result<VolumeOutcome, CommandError> {
        if percent > 100 {
            return Err(CommandError::InvalidVolume {
                volume: percent.into(),
            });
        }
        let volume = percent as f32 / 100.0;
        self.queue.set_volume(volume);

        let applied_to_current = if self.queue.current().is_some() && self.engine.is_active() {
            match self.engine.set_volume(volume).await {
                Ok(applied) => applied,
                Err(e) => {
                    warn!("Session {}: live volume change failed: {}", self.session_id, e);
                    false
                }
            }
        } else {
            false
        };

        self.events.emit_lossy(SessionEvent::VolumeChanged {
            session_id: self.session_id.clone(),
            volume,
            timestamp: chrono::Utc::now(),
        });

        Ok(VolumeOutcome {
            percent: percent as u8,
            applied_to_current,
        })
    }

    pub fn current(&self) -> Option<Track> {
        self.queue.current().cloned()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            session_id: self.session_id.clone(),
            state: self.state,
            playing: self.state.is_active(),
            current: self.queue.current().cloned(),
            pending: self.queue.peek_all(),
            volume: self.queue.volume(),
            consecutive_errors: self.queue.error_count(),
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    fn transition(&mut self, new_state: PlaybackState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        self.state = new_state;
        debug!(
            "Session {}: {} -> {}",
            self.session_id, old_state, new_state
        );
        self.events.emit_lossy(SessionEvent::PlaybackStateChanged {
            session_id: self.session_id.clone(),
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit_queue_changed(&self, trigger: QueueChangeTrigger) {
        self.events.emit_lossy(SessionEvent::QueueChanged {
            session_id: self.session_id.clone(),
            length: self.queue.len(),
            trigger,
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit_track_failed(&self, track: &Track, error: &EngineError, consecutive_errors: u32) {
        self.events.emit_lossy(SessionEvent::TrackFailed {
            session_id: self.session_id.clone(),
            track_id: track.id(),
            title: track.title().to_string(),
            error: error.to_string(),
            consecutive_errors,
            timestamp: chrono::Utc::now(),
        });
    }
}
