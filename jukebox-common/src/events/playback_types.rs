//! Playback-related type definitions

use serde::{Deserialize, Serialize};

/// Explicit state of one session's playback controller
///
/// `Starting` and `Stopping` are transitional: an engine command has been
/// issued and the controller is waiting for it to take effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing current
    Idle,
    /// Engine start issued for the current track
    Starting,
    /// Current track is streaming
    Playing,
    /// Current track is paused
    Paused,
    /// Engine stop issued; waiting for its completion to drive the advance
    Stopping,
}

impl PlaybackState {
    /// Whether the session has (or is moving to or from) a current track
    pub fn is_active(&self) -> bool {
        !matches!(self, PlaybackState::Idle)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Starting => write!(f, "starting"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopping => write!(f, "stopping"),
        }
    }
}
