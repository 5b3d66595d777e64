//! Playlist ingestion
//!
//! Converts a resolver result into queue tracks, applying the configured
//! ingestion limit. Preparation runs in the caller's task; insertion runs on
//! the session lane.

use crate::error::CommandError;
use crate::resolver::Resolution;
use crate::session::queue::SessionQueue;
use jukebox_common::config::IngestionLimit;
use jukebox_common::events::Placement;
use jukebox_common::Track;
use serde::Serialize;

/// Tracks accepted from one resolution, ready for insertion
#[derive(Debug, Clone)]
pub struct IngestBatch {
    tracks: Vec<Track>,
    total_count: usize,
    was_limited: bool,
    single: bool,
}

/// What one ingestion added, for caller reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub added: usize,
    pub was_limited: bool,
    pub total_count: usize,
    /// Result was a single item rather than a playlist
    pub single: bool,
    pub first_title: String,
}

/// Keep at most `limit` entries; reports whether any were dropped
pub fn apply_limit<T>(mut entries: Vec<T>, limit: IngestionLimit) -> (Vec<T>, bool) {
    match limit {
        IngestionLimit::Max(max) if entries.len() > max => {
            entries.truncate(max);
            (entries, true)
        }
        _ => (entries, false),
    }
}

/// Turn a resolution into a batch of tracks requested by `requester`
///
/// An empty playlist (or one emptied by a zero limit) is reported as
/// [`CommandError::NoTracksFound`].
pub fn prepare(
    resolution: Resolution,
    limit: IngestionLimit,
    requester: &str,
) -> Result<IngestBatch, CommandError> {
    let batch = match resolution {
        Resolution::Single(info) => IngestBatch {
            tracks: vec![info.into_track(requester)],
            total_count: 1,
            was_limited: false,
            single: true,
        },
        Resolution::Playlist {
            entries,
            total_count,
        } => {
            let total_count = total_count.max(entries.len());
            let (entries, was_limited) = apply_limit(entries, limit);
            IngestBatch {
                tracks: entries
                    .into_iter()
                    .map(|info| info.into_track(requester))
                    .collect(),
                total_count,
                was_limited,
                single: false,
            }
        }
    };

    if batch.tracks.is_empty() {
        return Err(CommandError::NoTracksFound);
    }
    Ok(batch)
}

impl IngestBatch {
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn was_limited(&self) -> bool {
        self.was_limited
    }

    fn report(&self, added: usize) -> IngestReport {
        IngestReport {
            added,
            was_limited: self.was_limited,
            total_count: self.total_count,
            single: self.single,
            first_title: self
                .tracks
                .first()
                .map(|t| t.title().to_string())
                .unwrap_or_default(),
        }
    }

    /// Insert every track as one ordered block
    pub fn insert(self, queue: &mut SessionQueue, placement: Placement) -> IngestReport {
        let report = self.report(self.tracks.len());
        queue.enqueue_batch(self.tracks, placement);
        report
    }

    /// Split off the first track; the remainder keeps the batch metadata
    ///
    /// The returned report counts only the remainder as added.
    pub fn split_first(mut self) -> Option<(Track, IngestBatch)> {
        if self.tracks.is_empty() {
            return None;
        }
        let first = self.tracks.remove(0);
        Some((first, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TrackInfo;

    fn playlist(n: usize) -> Resolution {
        Resolution::Playlist {
            entries: (0..n)
                .map(|i| TrackInfo::new(format!("id{}", i)).with_title(format!("Song {}", i)))
                .collect(),
            total_count: n,
        }
    }

    #[test]
    fn test_limit_applied() {
        let batch = prepare(playlist(120), IngestionLimit::Max(50), "alice").unwrap();
        assert_eq!(batch.len(), 50);
        assert!(batch.was_limited());
        assert_eq!(batch.total_count(), 120);
        assert_eq!(batch.tracks()[49].title(), "Song 49");
    }

    #[test]
    fn test_unlimited() {
        let batch = prepare(playlist(120), IngestionLimit::Unlimited, "alice").unwrap();
        assert_eq!(batch.len(), 120);
        assert!(!batch.was_limited());
        assert_eq!(batch.total_count(), 120);
    }

    #[test]
    fn test_exactly_at_limit_is_not_limited() {
        let batch = prepare(playlist(50), IngestionLimit::Max(50), "alice").unwrap();
        assert_eq!(batch.len(), 50);
        assert!(!batch.was_limited());
    }

    #[test]
    fn test_resolver_total_exceeding_list_is_reported() {
        let resolution = Resolution::Playlist {
            entries: vec![TrackInfo::new("a"), TrackInfo::new("b")],
            total_count: 300,
        };
        let batch = prepare(resolution, IngestionLimit::Max(50), "alice").unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!batch.was_limited());
        assert_eq!(batch.total_count(), 300);
    }

    #[test]
    fn test_empty_playlist_is_no_tracks() {
        let err = prepare(playlist(0), IngestionLimit::Unlimited, "alice").unwrap_err();
        assert_eq!(err, CommandError::NoTracksFound);
    }

    #[test]
    fn test_requester_recorded() {
        let single = Resolution::Single(TrackInfo::new("https://example.com/v"));
        let batch = prepare(single, IngestionLimit::default(), "bob").unwrap();
        assert_eq!(batch.tracks()[0].requested_by(), "bob");
        assert_eq!(batch.tracks()[0].title(), jukebox_common::track::UNKNOWN);
    }

    #[test]
    fn test_insert_next_places_block_before_prior_head() {
        let mut queue = SessionQueue::default();
        queue.enqueue(
            TrackInfo::new("x").with_title("X").into_track("carol"),
            Placement::Tail,
        );

        let resolution = Resolution::Playlist {
            entries: vec![
                TrackInfo::new("a").with_title("A"),
                TrackInfo::new("b").with_title("B"),
            ],
            total_count: 2,
        };
        let report = prepare(resolution, IngestionLimit::default(), "carol")
            .unwrap()
            .insert(&mut queue, Placement::Head);
        assert_eq!(report.added, 2);
        assert_eq!(report.first_title, "A");

        let order: Vec<String> = std::iter::from_fn(|| queue.dequeue_next())
            .map(|t| t.title().to_string())
            .collect();
        assert_eq!(order, vec!["A", "B", "X"]);
    }

    #[test]
    fn test_split_first() {
        let batch = prepare(playlist(3), IngestionLimit::default(), "dave").unwrap();
        let (first, rest) = batch.split_first().unwrap();
        assert_eq!(first.title(), "Song 0");
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.tracks()[0].title(), "Song 1");
    }
}
