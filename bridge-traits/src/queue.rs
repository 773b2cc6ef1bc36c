//! Now-playing queue and player control contracts.
//!
//! Hosts own the real play queue. The linking core only needs to splice
//! tracks in after the current entry, remove entries at absolute positions,
//! read the current position and skip forward, and it needs to know whether
//! shuffle is enabled.

use crate::error::Result;
use crate::library::TrackId;
use async_trait::async_trait;

/// Mutations of the host's now-playing list.
#[async_trait]
pub trait NowPlayingQueue: Send + Sync {
    /// Insert `track` immediately after the current entry.
    ///
    /// Repeated calls land in call order: the second insertion goes right
    /// after the first one, not in front of it.
    async fn insert_after_current(&self, track: &TrackId) -> Result<()>;

    /// Remove the entry at an absolute queue position.
    ///
    /// Returns [`BridgeError::InvalidPosition`](crate::BridgeError::InvalidPosition)
    /// when the position is out of range.
    async fn remove_at(&self, position: usize) -> Result<()>;

    /// Absolute position of the entry currently playing.
    async fn current_position(&self) -> Result<usize>;
}

/// Transport controls and player state.
#[async_trait]
pub trait PlayerControl: Send + Sync {
    /// Skip playback forward by one queue entry.
    async fn advance_to_next_track(&self) -> Result<()>;

    /// Whether shuffle mode is currently on.
    async fn is_shuffle_enabled(&self) -> Result<bool>;
}
