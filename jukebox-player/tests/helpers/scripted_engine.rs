//! Scripted playback engine
//!
//! Accepts every command, records it, and holds the relay of the active
//! track until the test finishes it. Starts of selected sources can be made
//! to fail.

use async_trait::async_trait;
use jukebox_common::SessionId;
use jukebox_player::engine::{CompletionRelay, EngineFactory, PlaybackEngine};
use jukebox_player::EngineError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Start(String),
    Stop,
    Pause,
    Resume,
    SetVolume(f32),
}

#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<EngineCall>>,
    active: Mutex<Option<(String, CompletionRelay)>>,
    failing: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    paused: AtomicBool,
    hold_on_stop: AtomicBool,
    held: Mutex<Vec<(String, CompletionRelay)>>,
}

impl ScriptedEngine {
    /// Reject future starts of `source_ref`
    pub fn fail_starts_of(&self, source_ref: &str) {
        self.failing.lock().unwrap().insert(source_ref.to_string());
    }

    /// Reject every future start
    pub fn fail_all_starts(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Keep the relay on `stop` instead of completing it, like a player
    /// that takes a while to exit
    pub fn hold_completions_on_stop(&self) {
        self.hold_on_stop.store(true, Ordering::SeqCst);
    }

    /// Complete every relay held back by `stop`; returns their sources
    pub fn release_held(&self) -> Vec<String> {
        let held = std::mem::take(&mut *self.held.lock().unwrap());
        held.into_iter()
            .map(|(source, relay)| {
                relay.finish(Ok(()));
                source
            })
            .collect()
    }

    /// End the active track with `outcome`; returns its source
    pub fn finish_current(&self, outcome: Result<(), EngineError>) -> Option<String> {
        let (source, relay) = self.active.lock().unwrap().take()?;
        relay.finish(outcome);
        Some(source)
    }

    pub fn active_source(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map(|(source, _)| source.clone())
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Sources passed to `start`, including rejected ones
    pub fn started(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Start(source) => Some(source),
                _ => None,
            })
            .collect()
    }

    pub fn is_paused_now(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlaybackEngine for ScriptedEngine {
    async fn start(
        &self,
        source_ref: &str,
        _volume: f32,
        relay: CompletionRelay,
    ) -> Result<(), EngineError> {
        self.record(EngineCall::Start(source_ref.to_string()));
        if self.fail_all.load(Ordering::SeqCst) || self.failing.lock().unwrap().contains(source_ref)
        {
            return Err(EngineError::Start(format!("cannot open {}", source_ref)));
        }
        self.paused.store(false, Ordering::SeqCst);
        *self.active.lock().unwrap() = Some((source_ref.to_string(), relay));
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Stop);
        self.paused.store(false, Ordering::SeqCst);
        if self.hold_on_stop.load(Ordering::SeqCst) {
            if let Some(active) = self.active.lock().unwrap().take() {
                self.held.lock().unwrap().push(active);
            }
        } else {
            self.finish_current(Ok(()));
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Pause);
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<(), EngineError> {
        self.record(EngineCall::Resume);
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<bool, EngineError> {
        self.record(EngineCall::SetVolume(volume));
        Ok(true)
    }

    fn is_active(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// Hands out one [`ScriptedEngine`] per session and keeps them reachable
#[derive(Default)]
pub struct ScriptedEngineFactory {
    engines: Mutex<HashMap<SessionId, Arc<ScriptedEngine>>>,
}

impl ScriptedEngineFactory {
    pub fn get(&self, session_id: &SessionId) -> Option<Arc<ScriptedEngine>> {
        self.engines.lock().unwrap().get(session_id).cloned()
    }

    pub fn created(&self) -> usize {
        self.engines.lock().unwrap().len()
    }
}

impl EngineFactory for ScriptedEngineFactory {
    fn create(&self, session_id: &SessionId) -> Arc<dyn PlaybackEngine> {
        let engine = Arc::new(ScriptedEngine::default());
        self.engines
            .lock()
            .unwrap()
            .insert(session_id.clone(), engine.clone());
        engine
    }
}
