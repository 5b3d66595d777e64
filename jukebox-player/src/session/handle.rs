//! Cloneable front door to one session
//!
//! Resolver lookups happen here, in the caller's task. Only the resulting
//! batch is posted to the lane.

use super::lane::SessionCommand;
use super::{
    EnqueueOutcome, MoveOutcome, PlayNowOutcome, QueueSnapshot, StartOutcome, StopOutcome,
    VolumeOutcome,
};
use crate::error::CommandError;
use crate::ingest::{self, IngestBatch};
use crate::resolver::MediaResolver;
use jukebox_common::config::IngestionLimit;
use jukebox_common::events::Placement;
use jukebox_common::{SessionId, Track};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionCommand>,
    resolver: Arc<dyn MediaResolver>,
    ingestion_limit: IngestionLimit,
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: SessionId,
        tx: mpsc::UnboundedSender<SessionCommand>,
        resolver: Arc<dyn MediaResolver>,
        ingestion_limit: IngestionLimit,
    ) -> Self {
        Self {
            session_id,
            tx,
            resolver,
            ingestion_limit,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Resolve `query` and append the result
    pub async fn play(&self, query: &str, requester: &str) -> Result<EnqueueOutcome, CommandError> {
        self.enqueue(query, requester, Placement::Tail).await
    }

    /// Resolve `query` and insert the result ahead of everything pending
    pub async fn play_next(
        &self,
        query: &str,
        requester: &str,
    ) -> Result<EnqueueOutcome, CommandError> {
        self.enqueue(query, requester, Placement::Head).await
    }

    /// Resolve `query` and play its first track immediately
    pub async fn play_now(
        &self,
        query: &str,
        requester: &str,
    ) -> Result<PlayNowOutcome, CommandError> {
        let batch = self.resolve(query, requester).await?;
        self.request(|reply| SessionCommand::PlayNow { batch, reply })
            .await?
    }

    /// Manual start of whatever is queued
    pub async fn start(&self) -> Result<StartOutcome, CommandError> {
        self.request(|reply| SessionCommand::Start { reply }).await
    }

    pub async fn skip(&self) -> Result<Track, CommandError> {
        self.request(|reply| SessionCommand::Skip { reply }).await?
    }

    pub async fn pause(&self) -> Result<Track, CommandError> {
        self.request(|reply| SessionCommand::Pause { reply }).await?
    }

    pub async fn resume(&self) -> Result<Track, CommandError> {
        self.request(|reply| SessionCommand::Resume { reply }).await?
    }

    pub async fn stop(&self) -> Result<StopOutcome, CommandError> {
        self.request(|reply| SessionCommand::Stop { reply }).await
    }

    /// Returns the number of pending tracks removed
    pub async fn clear(&self) -> Result<usize, CommandError> {
        self.request(|reply| SessionCommand::Clear { reply }).await
    }

    pub async fn shuffle(&self) -> Result<usize, CommandError> {
        self.request(|reply| SessionCommand::Shuffle { reply }).await?
    }

    /// Positions are 1-based
    pub async fn move_track(&self, from: usize, to: usize) -> Result<MoveOutcome, CommandError> {
        self.request(|reply| SessionCommand::Move { from, to, reply })
            .await?
    }

    /// Position is 1-based
    pub async fn remove(&self, position: usize) -> Result<Track, CommandError> {
        self.request(|reply| SessionCommand::Remove { position, reply })
            .await?
    }

    pub async fn set_volume(&self, percent: u32) -> Result<VolumeOutcome, CommandError> {
        self.request(|reply| SessionCommand::SetVolume { percent, reply })
            .await?
    }

    pub async fn snapshot(&self) -> Result<QueueSnapshot, CommandError> {
        self.request(|reply| SessionCommand::Snapshot { reply }).await
    }

    pub async fn current(&self) -> Result<Option<Track>, CommandError> {
        self.request(|reply| SessionCommand::Current { reply }).await
    }

    async fn enqueue(
        &self,
        query: &str,
        requester: &str,
        placement: Placement,
    ) -> Result<EnqueueOutcome, CommandError> {
        let batch = self.resolve(query, requester).await?;
        self.request(|reply| SessionCommand::Enqueue {
            batch,
            placement,
            reply,
        })
        .await
    }

    async fn resolve(&self, query: &str, requester: &str) -> Result<IngestBatch, CommandError> {
        info!(
            "Session {}: resolving '{}' for {}",
            self.session_id, query, requester
        );
        let resolution = self.resolver.resolve(query).await.map_err(|e| {
            warn!("Session {}: could not resolve '{}': {}", self.session_id, query, e);
            CommandError::from(e)
        })?;
        ingest::prepare(resolution, self.ingestion_limit, requester)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .map_err(|_| self.closed())?;
        rx.await.map_err(|_| self.closed())
    }

    fn closed(&self) -> CommandError {
        CommandError::SessionClosed {
            session_id: self.session_id.to_string(),
        }
    }
}
