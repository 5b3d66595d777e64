//! Track descriptors and session identifiers
//!
//! A [`Track`] is created once, at ingestion time, and never mutated afterwards.
//! Queue reordering moves whole tracks around; nothing edits one in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Placeholder used for unknown display strings
pub const UNKNOWN: &str = "Unknown";

/// Identifier of one independent queue/playback session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for SessionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Immutable descriptor of one queued item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: Uuid,
    source_ref: String,
    title: String,
    uploader: String,
    duration_secs: Option<u64>,
    requested_by: String,
}

impl Track {
    /// Create a track with a fresh identifier
    ///
    /// Missing `title`/`uploader` fall back to [`UNKNOWN`].
    pub fn new(
        source_ref: impl Into<String>,
        title: Option<String>,
        uploader: Option<String>,
        duration_secs: Option<u64>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_ref: source_ref.into(),
            title: display_or_unknown(title),
            uploader: display_or_unknown(uploader),
            duration_secs,
            requested_by: requested_by.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Opaque locator handed to the playback engine
    pub fn source_ref(&self) -> &str {
        &self.source_ref
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn uploader(&self) -> &str {
        &self.uploader
    }

    /// Duration in whole seconds, `None` when unknown
    pub fn duration_secs(&self) -> Option<u64> {
        self.duration_secs
    }

    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }
}

fn display_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => UNKNOWN.to_string(),
    }
}
