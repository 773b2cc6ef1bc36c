//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the shuffle-link core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other crates depend on. It
//! establishes the logging conventions, the validated engine configuration and
//! the broadcast channel that carries player notifications in and linking
//! actions out.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{LinkConfig, LinkConfigBuilder, MatchPolicy};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream, LinkEvent, PlayerEvent};
