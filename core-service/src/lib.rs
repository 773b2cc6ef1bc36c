//! Core service façade for shuffle-link.
//!
//! This crate wires host-provided bridge implementations (music library,
//! now-playing queue, player control) into the linking engine and exposes a
//! single [`ShuffleLinkService`] handle. Hosts either forward player
//! notifications to [`ShuffleLinkService::handle_event`] directly or publish
//! them on the service's event bus and let [`ShuffleLinkService::spawn`]
//! consume them.

pub mod error;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::{LinkDependencies, ShuffleLinkService, ShuffleLinkServiceBuilder};
