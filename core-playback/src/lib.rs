//! # Playback Module
//!
//! Reference now-playing queue for hosts and tests.
//!
//! ## Overview
//!
//! This module provides [`InMemoryQueue`], which implements both
//! [`NowPlayingQueue`](bridge_traits::NowPlayingQueue) and
//! [`PlayerControl`](bridge_traits::PlayerControl) over a plain track list with
//! a current position, a shuffle toggle and a mutation journal.

pub mod error;
pub mod queue;

pub use error::{PlaybackError, Result};
pub use queue::{InMemoryQueue, QueueMutation};
