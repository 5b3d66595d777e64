//! Child-process playback engine
//!
//! Plays each track by spawning an external player (mpv by default) and
//! watching it exit. The engine never touches audio samples.

use super::{CompletionRelay, EngineFactory, PlaybackEngine};
use crate::error::EngineError;
use async_trait::async_trait;
use jukebox_common::config::EngineConfig;
use jukebox_common::SessionId;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

/// Control side of the running player
struct RunningPlayer {
    stop_tx: oneshot::Sender<()>,
}

/// Flags shared with the watcher task
struct Status {
    /// Bumped on every start so an old watcher cannot clear a newer track's flags
    generation: AtomicU64,
    active: AtomicBool,
    paused: AtomicBool,
    /// Pid of the live player, tagged with its generation
    pid: std::sync::Mutex<Option<(u64, u32)>>,
}

impl Status {
    fn live_pid(&self) -> Option<u32> {
        self.pid
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|(_, pid)| pid)
    }

    /// Forget the player of `generation` once it has exited
    fn release(&self, generation: u64) {
        let mut pid = self.pid.lock().unwrap_or_else(PoisonError::into_inner);
        if pid.is_some_and(|(g, _)| g == generation) {
            *pid = None;
        }
        if self.generation.load(Ordering::SeqCst) == generation {
            self.active.store(false, Ordering::SeqCst);
            self.paused.store(false, Ordering::SeqCst);
        }
    }
}

pub struct ProcessEngine {
    config: EngineConfig,
    running: Mutex<Option<RunningPlayer>>,
    status: Arc<Status>,
}

impl ProcessEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            running: Mutex::new(None),
            status: Arc::new(Status {
                generation: AtomicU64::new(0),
                active: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                pid: std::sync::Mutex::new(None),
            }),
        }
    }

    fn command(&self, source_ref: &str, volume: f32) -> Command {
        let level = (volume.clamp(0.0, 1.0) * 100.0).round() as u32;
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.args)
            .arg(format!("{}{}", self.config.volume_flag, level))
            .arg(source_ref)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn signal(&self, name: &'static str) -> Result<(), EngineError> {
        let pid = self
            .status
            .live_pid()
            .ok_or_else(|| EngineError::Command("no player running".to_string()))?;
        send_signal(pid, name).await
    }
}

#[cfg(unix)]
async fn send_signal(pid: u32, name: &'static str) -> Result<(), EngineError> {
    let status = Command::new("kill")
        .arg(format!("-{}", name))
        .arg(pid.to_string())
        .status()
        .await
        .map_err(|e| EngineError::Command(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(EngineError::Command(format!(
            "kill -{} {} exited with {}",
            name, pid, status
        )))
    }
}

#[cfg(not(unix))]
async fn send_signal(_pid: u32, _name: &'static str) -> Result<(), EngineError> {
    Err(EngineError::Unsupported("pause/resume"))
}

async fn watch(
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    status: Arc<Status>,
    generation: u64,
    relay: CompletionRelay,
) {
    let outcome = tokio::select! {
        exit = child.wait() => match exit {
            Ok(exit) if exit.success() => Ok(()),
            Ok(exit) => Err(EngineError::Playback(format!("player exited with {}", exit))),
            Err(e) => Err(EngineError::Playback(e.to_string())),
        },
        _ = stop_rx => {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill player: {}", e);
            }
            Ok(())
        }
    };

    status.release(generation);
    debug!("Player for {} finished: {:?}", relay.play_id(), outcome);
    relay.finish(outcome);
}

#[async_trait]
impl PlaybackEngine for ProcessEngine {
    async fn start(
        &self,
        source_ref: &str,
        volume: f32,
        relay: CompletionRelay,
    ) -> Result<(), EngineError> {
        let mut running = self.running.lock().await;
        if let Some(previous) = running.take() {
            let _ = previous.stop_tx.send(());
        }

        let child = self.command(source_ref, volume).spawn().map_err(|e| {
            EngineError::Start(format!("{}: {}", self.config.program, e))
        })?;
        let pid = child.id();
        let (stop_tx, stop_rx) = oneshot::channel();

        let generation = self.status.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self
            .status
            .pid
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = pid.map(|pid| (generation, pid));
        self.status.active.store(true, Ordering::SeqCst);
        self.status.paused.store(false, Ordering::SeqCst);

        tokio::spawn(watch(
            child,
            stop_rx,
            Arc::clone(&self.status),
            generation,
            relay,
        ));
        *running = Some(RunningPlayer { stop_tx });
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        if let Some(running) = self.running.lock().await.take() {
            // Watcher already gone means the player exited on its own
            let _ = running.stop_tx.send(());
        }
        Ok(())
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.signal("STOP").await?;
        self.status.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self) -> Result<(), EngineError> {
        self.signal("CONT").await?;
        self.status.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn set_volume(&self, _volume: f32) -> Result<bool, EngineError> {
        // Applied through the volume flag on the next start
        Ok(false)
    }

    fn is_active(&self) -> bool {
        self.status.active.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.status.paused.load(Ordering::SeqCst)
    }
}

/// Builds one [`ProcessEngine`] per session from shared settings
pub struct ProcessEngineFactory {
    config: EngineConfig,
}

impl ProcessEngineFactory {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl EngineFactory for ProcessEngineFactory {
    fn create(&self, session_id: &SessionId) -> Arc<dyn PlaybackEngine> {
        debug!("Creating process engine for session {}", session_id);
        Arc::new(ProcessEngine::new(self.config.clone()))
    }
}
