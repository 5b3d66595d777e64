//! Error types for jukebox-player
//!
//! Defines module-specific error types using thiserror. Command failures are
//! typed values returned to the front-end, never panics or process exits.

use serde::Serialize;
use thiserror::Error;

/// Main error type for service startup and the HTTP server
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(#[from] jukebox_common::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Tracing subscriber setup errors
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Convenience Result type using jukebox-player Error
pub type Result<T> = std::result::Result<T, Error>;

/// Typed failure of one session command
///
/// Serialized into the JSON body of failed API calls as
/// `{"error": "<kind>", ...fields}`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum CommandError {
    /// Resolver returned nothing playable
    #[error("no songs found")]
    NoTracksFound,

    /// Resolver failed
    #[error("resolution error: {message}")]
    Resolution { message: String },

    /// 1-based position outside the pending queue
    #[error("invalid position {position}: queue has {len} songs")]
    InvalidPosition { position: usize, len: usize },

    /// Operation needs queued tracks or an active track and there are none
    #[error("queue is empty")]
    EmptyQueue,

    /// Pause while already paused
    #[error("playback is already paused")]
    AlreadyPaused,

    /// Resume while not paused
    #[error("nothing is paused")]
    NotPaused,

    /// Move with identical source and destination
    #[error("source and destination positions are the same ({position})")]
    SamePosition { position: usize },

    /// Shuffle with fewer than two queued tracks
    #[error("need at least two queued songs to shuffle")]
    NothingToShuffle,

    /// Volume percent outside 0-100
    #[error("volume must be between 0 and 100, got {volume}")]
    InvalidVolume { volume: i64 },

    /// Request body or path could not be decoded
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Engine rejected a pause/resume/stop command
    #[error("engine error: {message}")]
    Engine { message: String },

    /// Session lane is gone
    #[error("session {session_id} is closed")]
    SessionClosed { session_id: String },
}

impl From<ResolveError> for CommandError {
    fn from(e: ResolveError) -> Self {
        CommandError::Resolution {
            message: e.to_string(),
        }
    }
}

impl From<EngineError> for CommandError {
    fn from(e: EngineError) -> Self {
        CommandError::Engine {
            message: e.to_string(),
        }
    }
}

/// Playback engine failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Start command rejected
    #[error("failed to start playback: {0}")]
    Start(String),

    /// Playback ended abnormally
    #[error("playback failed: {0}")]
    Playback(String),

    /// Stop/pause/resume/volume command failed
    #[error("engine command failed: {0}")]
    Command(String),

    /// Operation not available on this engine or platform
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// Completion relay dropped without reporting
    #[error("completion dropped before playback finished")]
    CompletionDropped,
}

/// Media resolver failures
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Extractor could not be run
    #[error("failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),

    /// Extractor exited with an error
    #[error("{0}")]
    Extractor(String),

    /// Extractor output was not understood
    #[error("invalid extractor output: {0}")]
    Parse(#[from] serde_json::Error),
}
