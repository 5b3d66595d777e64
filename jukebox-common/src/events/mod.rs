//! Event types for the jukebox event system
//!
//! Provides the shared event definitions and the EventBus used to deliver
//! asynchronous session notifications (track started, playback halted, ...)
//! to whatever front-end is listening.

mod playback_types;
mod queue_types;

pub use playback_types::PlaybackState;
pub use queue_types::{Placement, QueueChangeTrigger};

use crate::track::{SessionId, Track};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Session notification
///
/// Every variant names the session it belongs to, so a single bus can carry
/// all sessions and subscribers filter with [`SessionEvent::session_id`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Controller state changed
    PlaybackStateChanged {
        session_id: SessionId,
        old_state: PlaybackState,
        new_state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Engine accepted a start command for `track`
    TrackStarted {
        session_id: SessionId,
        track: Track,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A start was rejected or playback ended with an error
    TrackFailed {
        session_id: SessionId,
        track_id: Uuid,
        title: String,
        error: String,
        /// Counter value after this failure
        consecutive_errors: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Auto-advance found nothing left to play
    QueueFinished {
        session_id: SessionId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Auto-advance halted after too many back-to-back failures
    ///
    /// Distinct from [`SessionEvent::QueueFinished`]: tracks may still be
    /// pending, and nothing plays until a manual start.
    PlaybackHalted {
        session_id: SessionId,
        consecutive_errors: u32,
        pending: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pending queue contents changed
    QueueChanged {
        session_id: SessionId,
        length: usize,
        trigger: QueueChangeTrigger,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session volume changed
    VolumeChanged {
        session_id: SessionId,
        /// Volume level (0.0-1.0)
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionEvent::PlaybackStateChanged { session_id, .. }
            | SessionEvent::TrackStarted { session_id, .. }
            | SessionEvent::TrackFailed { session_id, .. }
            | SessionEvent::QueueFinished { session_id, .. }
            | SessionEvent::PlaybackHalted { session_id, .. }
            | SessionEvent::QueueChanged { session_id, .. }
            | SessionEvent::VolumeChanged { session_id, .. } => session_id,
        }
    }

    /// Variant name, used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            SessionEvent::TrackStarted { .. } => "TrackStarted",
            SessionEvent::TrackFailed { .. } => "TrackFailed",
            SessionEvent::QueueFinished { .. } => "QueueFinished",
            SessionEvent::PlaybackHalted { .. } => "PlaybackHalted",
            SessionEvent::QueueChanged { .. } => "QueueChanged",
            SessionEvent::VolumeChanged { .. } => "VolumeChanged",
        }
    }
}

/// One-to-many broadcaster for [`SessionEvent`]s
///
/// Thin wrapper around a tokio broadcast channel. Slow subscribers lag and
/// lose the oldest events rather than blocking session lanes.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use jukebox_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
