//! # Host Bridge Traits
//!
//! Contracts between the shuffle-link core and the music player hosting it.
//!
//! ## Overview
//!
//! The core decides *what* to do with the play queue; the host decides *how*
//! it is done. Each trait here is a capability the core requires from the
//! host player:
//!
//! - [`MusicLibrary`](library::MusicLibrary) - comment lookup and first-match attribute search
//! - [`NowPlayingQueue`](queue::NowPlayingQueue) - insert after current, remove at position, current position
//! - [`PlayerControl`](queue::PlayerControl) - skip forward, shuffle state
//! - [`LoggerSink`](logging::LoggerSink) - forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Host adapters
//! should convert their native failures into it and keep the message
//! actionable (which track, which position).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single adapter can be shared
//! between the event loop and the debounce timer task.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::{MusicLibrary, TrackId, TrackQuery};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct HostLibrary { /* player api handle */ }
//!
//! #[async_trait]
//! impl MusicLibrary for HostLibrary {
//!     async fn comment(&self, track: &TrackId) -> Result<Option<String>> {
//!         todo!()
//!     }
//!
//!     async fn query_first_match(&self, query: &TrackQuery) -> Result<Option<TrackId>> {
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod library;
pub mod logging;
pub mod queue;

pub use error::BridgeError;

pub use library::{
    CombineMethod, Comparison, Condition, MusicLibrary, TrackField, TrackId, TrackQuery,
};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use queue::{NowPlayingQueue, PlayerControl};
