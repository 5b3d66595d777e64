//! Completion relay
//!
//! The engine reports "track finished" from whatever context it runs in. The
//! relay only posts that report onto the owning session's lane; controller
//! logic never runs on the engine's side.

use super::lane::SessionCommand;
use crate::error::EngineError;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// One-shot completion callback for a single engine start
///
/// Consumed by [`CompletionRelay::finish`]. Dropping it unfired reports
/// [`EngineError::CompletionDropped`], so a crashed playback task still
/// advances the session.
#[derive(Debug)]
pub struct CompletionRelay {
    play_id: Uuid,
    tx: Option<mpsc::UnboundedSender<SessionCommand>>,
}

impl CompletionRelay {
    pub(crate) fn new(play_id: Uuid, tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self {
            play_id,
            tx: Some(tx),
        }
    }

    /// Token of the start this relay belongs to
    pub fn play_id(&self) -> Uuid {
        self.play_id
    }

    /// Report how playback ended. Callable from any thread.
    pub fn finish(mut self, outcome: Result<(), EngineError>) {
        self.post(outcome);
    }

    fn post(&mut self, outcome: Result<(), EngineError>) {
        if let Some(tx) = self.tx.take() {
            let command = SessionCommand::EngineFinished {
                play_id: self.play_id,
                outcome,
            };
            if tx.send(command).is_err() {
                debug!("Session lane closed, dropping completion for {}", self.play_id);
            }
        }
    }
}

impl Drop for CompletionRelay {
    fn drop(&mut self) {
        if self.tx.is_some() {
            self.post(Err(EngineError::CompletionDropped));
        }
    }
}
