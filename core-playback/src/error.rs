//! # Playback Error Types
//!
//! Errors raised by the in-memory now-playing queue.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur while mutating or navigating the queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Attempted operation when nothing is playing.
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Position is outside the queue.
    #[error("Queue position {position} out of range (len {len})")]
    PositionOutOfRange { position: usize, len: usize },

    /// Skip requested while the last entry is playing.
    #[error("End of queue reached")]
    EndOfQueue,
}

impl PlaybackError {
    /// Returns `true` if the queue was empty or exhausted rather than misaddressed.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PlaybackError::NoTrackLoaded | PlaybackError::EndOfQueue)
    }
}

impl From<PlaybackError> for BridgeError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::PositionOutOfRange { position, len } => {
                BridgeError::InvalidPosition { position, len }
            }
            other => BridgeError::NotAvailable(other.to_string()),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
