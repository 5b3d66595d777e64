//! Session Registry
//!
//! Process-wide map from session id to its lane. Sessions are created on first
//! access and live for the rest of the process.

use crate::engine::EngineFactory;
use crate::resolver::MediaResolver;
use crate::session::{lane, SessionHandle, SessionSettings};
use jukebox_common::events::EventBus;
use jukebox_common::SessionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    resolver: Arc<dyn MediaResolver>,
    engines: Arc<dyn EngineFactory>,
    events: Arc<EventBus>,
    settings: SessionSettings,
}

impl SessionRegistry {
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        engines: Arc<dyn EngineFactory>,
        events: Arc<EventBus>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            resolver,
            engines,
            events,
            settings,
        }
    }

    /// Return the session for `session_id`, creating it if absent
    ///
    /// Concurrent first accesses for the same id yield the same session.
    pub async fn get_or_create(&self, session_id: &SessionId) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(session_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn_session(session_id))
            .clone()
    }

    /// Known session ids, sorted
    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    fn spawn_session(&self, session_id: &SessionId) -> SessionHandle {
        info!("Creating session {}", session_id);
        let engine = self.engines.create(session_id);
        let (tx, _task) = lane::spawn(
            session_id.clone(),
            engine,
            Arc::clone(&self.events),
            self.settings,
        );
        SessionHandle::new(
            session_id.clone(),
            tx,
            Arc::clone(&self.resolver),
            self.settings.ingestion_limit,
        )
    }
}
