//! Workspace facade crate.
//!
//! Exposes feature flags that map to the individual workspace crates so a
//! host player can depend on `shuffle-link-workspace` alone:
//!
//! - `service` (default) re-exports [`core-service`](core_service)
//! - `reference-host` adds the in-memory library and queue used by tests
//!   and demos

#[cfg(feature = "service")]
pub use core_service::*;

#[cfg(feature = "reference-host")]
pub use core_library::{InMemoryLibrary, Track};

#[cfg(feature = "reference-host")]
pub use core_playback::InMemoryQueue;
