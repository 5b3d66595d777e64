//! Test helper modules for jukebox-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - ScriptedEngine: records commands and completes tracks on demand
//! - StaticResolver: canned resolver results keyed by query
//! - TestJukebox: registry wired to both, with access to per-session engines

#![allow(dead_code)]

pub mod scripted_engine;
pub mod static_resolver;

pub use scripted_engine::{EngineCall, ScriptedEngine, ScriptedEngineFactory};
pub use static_resolver::StaticResolver;

use jukebox_common::events::{EventBus, SessionEvent};
use jukebox_common::SessionId;
use jukebox_player::resolver::{Resolution, TrackInfo};
use jukebox_player::{SessionHandle, SessionRegistry, SessionSettings};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Registry backed by scripted collaborators
pub struct TestJukebox {
    pub registry: Arc<SessionRegistry>,
    pub engines: Arc<ScriptedEngineFactory>,
    pub events: Arc<EventBus>,
}

impl TestJukebox {
    pub fn new(resolver: StaticResolver) -> Self {
        Self::with_settings(resolver, SessionSettings::default())
    }

    pub fn with_settings(resolver: StaticResolver, settings: SessionSettings) -> Self {
        let engines = Arc::new(ScriptedEngineFactory::default());
        let events = Arc::new(EventBus::new(1024));
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(resolver),
            engines.clone(),
            events.clone(),
            settings,
        ));
        Self {
            registry,
            engines,
            events,
        }
    }

    pub async fn session(&self, id: &str) -> SessionHandle {
        self.registry.get_or_create(&SessionId::from(id)).await
    }

    /// Engine of a session that has already been created
    pub fn engine(&self, id: &str) -> Arc<ScriptedEngine> {
        self.engines
            .get(&SessionId::from(id))
            .unwrap_or_else(|| panic!("no engine for session {}", id))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Playlist resolution whose entries are titled `<prefix>0`, `<prefix>1`, ...
pub fn playlist(prefix: &str, count: usize) -> Resolution {
    Resolution::Playlist {
        entries: (0..count)
            .map(|i| {
                let name = format!("{}{}", prefix, i);
                TrackInfo::new(name.clone()).with_title(name)
            })
            .collect(),
        total_count: count,
    }
}

/// Titles of the tracks pending in `handle`'s queue
pub async fn pending_titles(handle: &SessionHandle) -> Vec<String> {
    handle
        .snapshot()
        .await
        .unwrap()
        .pending
        .iter()
        .map(|t| t.title().to_string())
        .collect()
}

/// Everything published so far
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn count_type(events: &[SessionEvent], event_type: &str) -> usize {
    events
        .iter()
        .filter(|e| e.event_type() == event_type)
        .count()
}
