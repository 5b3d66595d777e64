//! # Jukebox Player Library (jukebox-player)
//!
//! Multi-session media queue with a playback state machine, auto-advance and
//! a consecutive-error cap.
//!
//! **Architecture:** One tokio task (lane) per session owns that session's
//! queue and controller. Commands and engine completions are messages on the
//! lane, applied one at a time. Resolvers and engines sit behind traits.

pub mod api;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod session;

pub use error::{CommandError, EngineError, Error, ResolveError, Result};
pub use registry::SessionRegistry;
pub use session::{SessionHandle, SessionSettings};
