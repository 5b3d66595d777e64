//! Session lane
//!
//! One tokio task per session owns the [`PlaybackController`] and drains an
//! unbounded mailbox. User commands and engine completions are both messages,
//! so they apply strictly one at a time in arrival order. The lane suspends
//! only while awaiting the engine.

use super::controller::PlaybackController;
use super::{
    EnqueueOutcome, MoveOutcome, PlayNowOutcome, QueueSnapshot, SessionSettings, StartOutcome,
    StopOutcome, VolumeOutcome,
};
use crate::engine::PlaybackEngine;
use crate::error::{CommandError, EngineError};
use crate::ingest::IngestBatch;
use jukebox_common::events::{EventBus, Placement};
use jukebox_common::{SessionId, Track};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

type Reply<T> = oneshot::Sender<T>;

/// Message applied on a session lane
#[derive(Debug)]
pub enum SessionCommand {
    Enqueue {
        batch: IngestBatch,
        placement: Placement,
        reply: Reply<EnqueueOutcome>,
    },
    PlayNow {
        batch: IngestBatch,
        reply: Reply<Result<PlayNowOutcome, CommandError>>,
    },
    Start {
        reply: Reply<StartOutcome>,
    },
    Skip {
        reply: Reply<Result<Track, CommandError>>,
    },
    Pause {
        reply: Reply<Result<Track, CommandError>>,
    },
    Resume {
        reply: Reply<Result<Track, CommandError>>,
    },
    Stop {
        reply: Reply<StopOutcome>,
    },
    Clear {
        reply: Reply<usize>,
    },
    Shuffle {
        reply: Reply<Result<usize, CommandError>>,
    },
    Move {
        from: usize,
        to: usize,
        reply: Reply<Result<MoveOutcome, CommandError>>,
    },
    Remove {
        position: usize,
        reply: Reply<Result<Track, CommandError>>,
    },
    SetVolume {
        percent: u32,
        reply: Reply<Result<VolumeOutcome, CommandError>>,
    },
    Snapshot {
        reply: Reply<QueueSnapshot>,
    },
    Current {
        reply: Reply<Option<Track>>,
    },
    /// Posted by a [`super::CompletionRelay`]
    EngineFinished {
        play_id: Uuid,
        outcome: Result<(), EngineError>,
    },
}

/// Create a controller and spawn its lane
///
/// Returns the lane's mailbox sender and the task handle.
pub fn spawn(
    session_id: SessionId,
    engine: Arc<dyn PlaybackEngine>,
    events: Arc<EventBus>,
    settings: SessionSettings,
) -> (mpsc::UnboundedSender<SessionCommand>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = PlaybackController::new(session_id, engine, events, settings, tx.clone());
    let task = tokio::spawn(run(controller, rx));
    (tx, task)
}

async fn run(mut controller: PlaybackController, mut rx: mpsc::UnboundedReceiver<SessionCommand>) {
    debug!("Session lane {} started", controller.session_id());

    while let Some(command) = rx.recv().await {
        dispatch(&mut controller, command).await;
    }

    debug!("Session lane {} stopped", controller.session_id());
}

/// Apply one message; a caller that gave up on its reply is not an error
async fn dispatch(controller: &mut PlaybackController, command: SessionCommand) {
    match command {
        SessionCommand::Enqueue {
            batch,
            placement,
            reply,
        } => {
            let _ = reply.send(controller.enqueue(batch, placement).await);
        }
        SessionCommand::PlayNow { batch, reply } => {
            let _ = reply.send(controller.play_now(batch).await);
        }
        SessionCommand::Start { reply } => {
            let _ = reply.send(controller.request_play().await);
        }
        SessionCommand::Skip { reply } => {
            let _ = reply.send(controller.skip().await);
        }
        SessionCommand::Pause { reply } => {
            let _ = reply.send(controller.pause().await);
        }
        SessionCommand::Resume { reply } => {
            let _ = reply.send(controller.resume().await);
        }
        SessionCommand::Stop { reply } => {
            let _ = reply.send(controller.stop().await);
        }
        SessionCommand::Clear { reply } => {
            let _ = reply.send(controller.clear());
        }
        SessionCommand::Shuffle { reply } => {
            let _ = reply.send(controller.shuffle());
        }
        SessionCommand::Move { from, to, reply } => {
            let _ = reply.send(controller.move_track(from, to));
        }
        SessionCommand::Remove { position, reply } => {
            let _ = reply.send(controller.remove(position));
        }
        SessionCommand::SetVolume { percent, reply } => {
            let _ = reply.send(controller.set_volume(percent).await);
        }
        SessionCommand::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
        }
        SessionCommand::Current { reply } => {
            let _ = reply.send(controller.current());
        }
        SessionCommand::EngineFinished { play_id, outcome } => {
            controller.engine_finished(play_id, outcome).await;
        }
    }
}
