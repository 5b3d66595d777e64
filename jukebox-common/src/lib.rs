//! # Jukebox Common Library
//!
//! Shared code for the jukebox services including:
//! - Track and session identifier types
//! - Event types (SessionEvent enum) and the EventBus
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod track;

pub use error::{Error, Result};
pub use track::{SessionId, Track};
