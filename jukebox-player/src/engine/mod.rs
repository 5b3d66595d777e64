//! Playback engine seam
//!
//! The engine is a commanded device: the controller tells it to start, stop,
//! pause and resume, and it reports the end of every successful start exactly
//! once through the [`CompletionRelay`] handed to `start`.

pub mod process;

pub use crate::session::relay::CompletionRelay;
pub use process::{ProcessEngine, ProcessEngineFactory};

use crate::error::EngineError;
use async_trait::async_trait;
use jukebox_common::SessionId;
use std::sync::Arc;

/// Commanded playback device for one session
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Begin playing `source_ref` at `volume` (0.0-1.0)
    ///
    /// On `Ok` the engine owns `relay` and must fire it when playback ends.
    /// On `Err` the relay is dropped unfired.
    async fn start(
        &self,
        source_ref: &str,
        volume: f32,
        relay: CompletionRelay,
    ) -> Result<(), EngineError>;

    /// Stop the active track; its relay then reports success
    async fn stop(&self) -> Result<(), EngineError>;

    async fn pause(&self) -> Result<(), EngineError>;

    async fn resume(&self) -> Result<(), EngineError>;

    /// Change the volume of the active track
    ///
    /// Returns `false` when the change only applies from the next track.
    async fn set_volume(&self, volume: f32) -> Result<bool, EngineError>;

    fn is_active(&self) -> bool;

    fn is_paused(&self) -> bool;
}

/// Creates one engine per session
pub trait EngineFactory: Send + Sync {
    fn create(&self, session_id: &SessionId) -> Arc<dyn PlaybackEngine>;
}
