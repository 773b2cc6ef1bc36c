//! # Link Module
//!
//! Keeps linked tracks contiguous while the host player shuffles.
//!
//! ## Overview
//!
//! Tracks declare their neighbours with `Next:` / `Previous:` lines in the
//! comment tag. This crate:
//! - Parses those lines into [`LinkReference`]s ([`reference`])
//! - Resolves references to library tracks ([`resolver`])
//! - Walks links outward from the playing track into a [`Chain`] ([`chain`])
//! - Splices chains into the now-playing queue and retracts stale ones
//!   ([`reconciler`])
//! - Backs off while the listener edits the queue ([`debounce`])
//!
//! Timers and event plumbing live in `core-service`; everything here is
//! driven by explicit calls.

pub mod chain;
pub mod debounce;
pub mod error;
pub mod reconciler;
pub mod reference;
pub mod resolver;

pub use chain::{Chain, ChainBuilder};
pub use debounce::{Debouncer, SuppressionTicket};
pub use error::{LinkError, Result};
pub use reconciler::{
    IgnoreReason, QueueChangeOutcome, QueueReconciler, ReconcileOutcome, ReconciliationState,
    Retraction,
};
pub use reference::{find_directional_link, parse_reference, LinkDirection, LinkReference};
pub use resolver::{build_query, TrackResolver};
