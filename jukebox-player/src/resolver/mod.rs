//! Media resolver seam
//!
//! A resolver turns a search term or URL into either one track descriptor or
//! an ordered list of lightweight playlist entries. Lookups run in the
//! caller's task, never inside a session lane.

pub mod ytdlp;

pub use ytdlp::YtDlpResolver;

use crate::error::ResolveError;
use async_trait::async_trait;
use jukebox_common::Track;

/// Descriptor of one resolvable item, before it becomes a [`Track`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub source_ref: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration_secs: Option<u64>,
}

impl TrackInfo {
    pub fn new(source_ref: impl Into<String>) -> Self {
        Self {
            source_ref: source_ref.into(),
            title: None,
            uploader: None,
            duration_secs: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    pub fn with_duration(mut self, secs: u64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Build the immutable queue track for `requested_by`
    pub fn into_track(self, requested_by: &str) -> Track {
        Track::new(
            self.source_ref,
            self.title,
            self.uploader,
            self.duration_secs,
            requested_by,
        )
    }
}

/// Result of one resolver lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Query named exactly one item
    Single(TrackInfo),

    /// Query named a list; `total_count` may exceed `entries.len()`
    Playlist {
        entries: Vec<TrackInfo>,
        total_count: usize,
    },
}

/// Asynchronous lookup service
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Resolution, ResolveError>;
}
