//! Session Queue
//!
//! Per-session pending tracks plus the current track, volume and
//! consecutive-error counter. Pure in-memory state: nothing here blocks or
//! locks. Exclusive access is guaranteed by the session lane that owns it.

use jukebox_common::events::Placement;
use jukebox_common::Track;
use std::collections::VecDeque;

/// Queue state for one session
#[derive(Debug)]
pub struct SessionQueue {
    /// Tracks waiting to play, head first
    pending: VecDeque<Track>,

    /// Track presently active (never also in `pending`)
    current: Option<Track>,

    /// Volume (0.0-1.0), carried across tracks
    volume: f32,

    /// Back-to-back playback failures
    consecutive_errors: u32,
}

impl SessionQueue {
    /// Create an empty queue with the given initial volume
    pub fn new(volume: f32) -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            volume,
            consecutive_errors: 0,
        }
    }

    /// Insert one track at the head or tail of `pending`
    pub fn enqueue(&mut self, track: Track, placement: Placement) {
        match placement {
            Placement::Head => self.pending.push_front(track),
            Placement::Tail => self.pending.push_back(track),
        }
    }

    /// Insert a batch so it keeps its order relative to itself
    ///
    /// With [`Placement::Head`] the first track of the batch ends up at the
    /// head, followed by the rest of the batch, then the prior pending tracks.
    pub fn enqueue_batch(&mut self, tracks: Vec<Track>, placement: Placement) {
        match placement {
            Placement::Tail => self.pending.extend(tracks),
            Placement::Head => {
                for track in tracks.into_iter().rev() {
                    self.pending.push_front(track);
                }
            }
        }
    }

    /// Remove and return the head of `pending`; does not touch `current`
    pub fn dequeue_next(&mut self) -> Option<Track> {
        self.pending.pop_front()
    }

    /// Ordered copy of `pending`
    pub fn peek_all(&self) -> Vec<Track> {
        self.pending.iter().cloned().collect()
    }

    /// Substitute the whole pending sequence
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.pending = tracks.into();
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn set_current(&mut self, track: Track) {
        self.current = Some(track);
    }

    pub fn take_current(&mut self) -> Option<Track> {
        self.current.take()
    }

    /// Set volume; callers clamp to 0.0-1.0 first
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn reset_error_count(&mut self) {
        self.consecutive_errors = 0;
    }

    /// Increment and return the new count
    pub fn increment_error_count(&mut self) -> u32 {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        self.consecutive_errors
    }

    pub fn error_count(&self) -> u32 {
        self.consecutive_errors
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new(0.5)
    }
}
