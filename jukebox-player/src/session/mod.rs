//! Per-session queue, controller and lane
//!
//! Each session owns a [`queue::SessionQueue`] and a
//! [`controller::PlaybackController`]. Both live inside one tokio task (the
//! session lane), which applies commands and engine completions one at a time
//! in arrival order. Callers talk to it through a cloneable [`SessionHandle`].

pub mod controller;
pub mod handle;
pub mod lane;
pub mod queue;
pub mod relay;

pub use controller::PlaybackController;
pub use handle::SessionHandle;
pub use relay::CompletionRelay;

use crate::ingest::IngestReport;
use jukebox_common::config::{IngestionLimit, TomlConfig};
use jukebox_common::events::PlaybackState;
use jukebox_common::{SessionId, Track};
use serde::Serialize;

/// Per-session tunables, taken from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub ingestion_limit: IngestionLimit,
    /// Back-to-back failures that halt auto-advance
    pub max_consecutive_errors: u32,
    pub default_volume: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ingestion_limit: IngestionLimit::default(),
            max_consecutive_errors: 3,
            default_volume: 0.5,
        }
    }
}

impl From<&TomlConfig> for SessionSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            ingestion_limit: config.ingestion_limit,
            max_consecutive_errors: config.max_consecutive_errors,
            default_volume: config.default_volume,
        }
    }
}

/// Result of asking the controller to start the queue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    /// Engine accepted `track`
    Started { track: Track },
    /// Nothing was left to play
    QueueEmpty,
    /// Too many back-to-back failures; nothing plays until a manual start
    Halted { consecutive_errors: u32 },
    /// Playback was already underway
    AlreadyActive { state: PlaybackState },
}

/// Result of `play` / `play_next`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnqueueOutcome {
    #[serde(flatten)]
    pub report: IngestReport,
    /// Present when the enqueue found the session idle and started it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback: Option<StartOutcome>,
}

/// Result of `play_now`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayNowOutcome {
    /// Track the request asked for
    pub requested: Track,
    /// Remaining resolved tracks placed at the head of the queue
    pub queued: usize,
    pub was_limited: bool,
    pub total_count: usize,
    /// What actually started; differs from `requested` when its start failed
    pub playback: StartOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopOutcome {
    /// Pending tracks discarded
    pub cleared: usize,
    pub was_playing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub track: Track,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeOutcome {
    pub percent: u8,
    /// `false` when the change only takes effect from the next track
    pub applied_to_current: bool,
}

/// Read-only view of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSnapshot {
    pub session_id: SessionId,
    pub state: PlaybackState,
    pub playing: bool,
    pub current: Option<Track>,
    pub pending: Vec<Track>,
    pub volume: f32,
    pub consecutive_errors: u32,
}
