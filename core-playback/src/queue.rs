//! # Now-Playing Queue
//!
//! In-memory play queue implementing [`NowPlayingQueue`] and [`PlayerControl`].
//!
//! ## Queue-next cursor
//!
//! `insert_after_current` keeps a cursor so consecutive insertions land one
//! after another rather than each jumping to the front:
//!
//! ```rust
//! # futures::executor::block_on(async {
//! use bridge_traits::{NowPlayingQueue, TrackId};
//! use core_playback::InMemoryQueue;
//!
//! let queue = InMemoryQueue::with_tracks(["a", "x"]);
//! queue.insert_after_current(&TrackId::from("b")).await.unwrap();
//! queue.insert_after_current(&TrackId::from("c")).await.unwrap();
//!
//! let order: Vec<_> = queue.entries().iter().map(|t| t.to_string()).collect();
//! assert_eq!(order, ["a", "b", "c", "x"]);
//! # });
//! ```
//!
//! The cursor resets whenever the current entry changes.
//!
//! Every insert, removal and skip is appended to a journal so callers can
//! assert exactly which mutations a reconciliation step performed.

use crate::error::{PlaybackError, Result};
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{NowPlayingQueue, PlayerControl, TrackId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// One mutation applied through the bridge traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueMutation {
    Inserted { position: usize, track: TrackId },
    Removed { position: usize, track: TrackId },
    Advanced { from: usize, to: usize },
}

#[derive(Debug, Default)]
struct QueueState {
    entries: Vec<TrackId>,
    current: Option<usize>,
    /// Where the next `insert_after_current` lands.
    insert_cursor: usize,
    shuffle: bool,
    journal: Vec<QueueMutation>,
}

impl QueueState {
    fn set_current(&mut self, position: Option<usize>) {
        self.current = position;
        self.insert_cursor = position.map_or(0, |p| p + 1);
    }

    fn current(&self) -> Result<usize> {
        self.current.ok_or(PlaybackError::NoTrackLoaded)
    }
}

/// Thread-safe in-memory now-playing list.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `tracks` with the first one playing.
    pub fn with_tracks<I, T>(tracks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackId>,
    {
        let queue = Self::new();
        for track in tracks {
            queue.push(track);
        }
        queue
    }

    /// Enable or disable shuffle mode.
    pub fn with_shuffle(self, enabled: bool) -> Self {
        self.set_shuffle(enabled);
        self
    }

    /// Append a track at the end, as a listener's "play last" would.
    ///
    /// Not journaled. The first pushed track becomes current.
    pub fn push(&self, track: impl Into<TrackId>) {
        let mut state = self.state.lock();
        state.entries.push(track.into());
        if state.current.is_none() {
            state.set_current(Some(0));
        }
    }

    /// Jump to an absolute position, as a listener's double-click would.
    pub fn play_at(&self, position: usize) -> Result<TrackId> {
        let mut state = self.state.lock();
        let len = state.entries.len();
        let track = state
            .entries
            .get(position)
            .cloned()
            .ok_or(PlaybackError::PositionOutOfRange { position, len })?;
        state.set_current(Some(position));
        debug!(position, track = %track, "Jumped to queue entry");
        Ok(track)
    }

    pub fn set_shuffle(&self, enabled: bool) {
        self.state.lock().shuffle = enabled;
    }

    pub fn current_track(&self) -> Option<TrackId> {
        let state = self.state.lock();
        state.current.and_then(|p| state.entries.get(p).cloned())
    }

    /// Snapshot of the queue contents in play order.
    pub fn entries(&self) -> Vec<TrackId> {
        self.state.lock().entries.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Mutations recorded so far.
    pub fn mutations(&self) -> Vec<QueueMutation> {
        self.state.lock().journal.clone()
    }

    /// Drain the journal.
    pub fn take_mutations(&self) -> Vec<QueueMutation> {
        std::mem::take(&mut self.state.lock().journal)
    }

    fn insert_after(&self, track: &TrackId) -> Result<usize> {
        let mut state = self.state.lock();
        let current = state.current()?;
        let position = state
            .insert_cursor
            .max(current + 1)
            .min(state.entries.len());
        state.entries.insert(position, track.clone());
        state.insert_cursor = position + 1;
        state.journal.push(QueueMutation::Inserted {
            position,
            track: track.clone(),
        });
        trace!(position, track = %track, "Queue insert");
        Ok(position)
    }

    fn remove(&self, position: usize) -> Result<TrackId> {
        let mut state = self.state.lock();
        let len = state.entries.len();
        if position >= len {
            return Err(PlaybackError::PositionOutOfRange { position, len });
        }
        let track = state.entries.remove(position);

        if let Some(current) = state.current {
            let remaining = state.entries.len();
            if position < current {
                state.current = Some(current - 1);
            } else if position == current {
                // The following entry takes the removed one's place.
                state.current = remaining.checked_sub(1).map(|last| current.min(last));
            }
        }
        if position < state.insert_cursor {
            state.insert_cursor -= 1;
        }

        state.journal.push(QueueMutation::Removed {
            position,
            track: track.clone(),
        });
        trace!(position, track = %track, "Queue remove");
        Ok(track)
    }

    fn advance(&self) -> Result<usize> {
        let mut state = self.state.lock();
        let from = state.current()?;
        let to = from + 1;
        if to >= state.entries.len() {
            return Err(PlaybackError::EndOfQueue);
        }
        state.set_current(Some(to));
        state.journal.push(QueueMutation::Advanced { from, to });
        trace!(from, to, "Advanced playback");
        Ok(to)
    }
}

#[async_trait]
impl NowPlayingQueue for InMemoryQueue {
    async fn insert_after_current(&self, track: &TrackId) -> BridgeResult<()> {
        self.insert_after(track)?;
        Ok(())
    }

    async fn remove_at(&self, position: usize) -> BridgeResult<()> {
        self.remove(position)?;
        Ok(())
    }

    async fn current_position(&self) -> BridgeResult<usize> {
        Ok(self.state.lock().current()?)
    }
}

#[async_trait]
impl PlayerControl for InMemoryQueue {
    async fn advance_to_next_track(&self) -> BridgeResult<()> {
        self.advance()?;
        Ok(())
    }

    async fn is_shuffle_enabled(&self) -> BridgeResult<bool> {
        Ok(self.state.lock().shuffle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(queue: &InMemoryQueue) -> Vec<String> {
        queue.entries().iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_push_sets_first_current() {
        let queue = InMemoryQueue::new();
        assert!(queue.current_track().is_none());
        queue.push("a");
        queue.push("b");
        assert_eq!(queue.current_track(), Some(TrackId::from("a")));
        assert!(queue.mutations().is_empty());
    }

    #[test]
    fn test_cursor_resets_on_jump() {
        let queue = InMemoryQueue::with_tracks(["a", "b", "c"]);
        queue.insert_after(&TrackId::from("x")).unwrap();
        queue.play_at(2).unwrap();
        queue.insert_after(&TrackId::from("y")).unwrap();
        assert_eq!(ids(&queue), ["a", "x", "b", "y", "c"]);
    }

    #[test]
    fn test_remove_before_current_shifts_current() {
        let queue = InMemoryQueue::with_tracks(["a", "b", "c"]);
        queue.play_at(2).unwrap();
        queue.remove(0).unwrap();
        assert_eq!(queue.current_track(), Some(TrackId::from("c")));
        assert_eq!(queue.state.lock().current, Some(1));
    }

    #[test]
    fn test_remove_current_promotes_following_entry() {
        let queue = InMemoryQueue::with_tracks(["a", "b"]);
        queue.remove(0).unwrap();
        assert_eq!(queue.current_track(), Some(TrackId::from("b")));
        queue.remove(0).unwrap();
        assert!(queue.current_track().is_none());
    }

    #[test]
    fn test_remove_out_of_range() {
        let queue = InMemoryQueue::with_tracks(["a"]);
        assert_eq!(
            queue.remove(3),
            Err(PlaybackError::PositionOutOfRange { position: 3, len: 1 })
        );
    }

    #[test]
    fn test_advance_at_end() {
        let queue = InMemoryQueue::with_tracks(["a"]);
        let err = queue.advance().unwrap_err();
        assert!(err.is_exhausted());

        let empty = InMemoryQueue::new();
        assert_eq!(empty.advance(), Err(PlaybackError::NoTrackLoaded));
    }

    #[test]
    fn test_bridge_error_mapping() {
        use bridge_traits::BridgeError;

        let err: BridgeError = PlaybackError::PositionOutOfRange { position: 4, len: 2 }.into();
        assert!(matches!(
            err,
            BridgeError::InvalidPosition { position: 4, len: 2 }
        ));

        let err: BridgeError = PlaybackError::EndOfQueue.into();
        assert!(matches!(err, BridgeError::NotAvailable(_)));
    }
}
