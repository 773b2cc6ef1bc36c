//! # Library Module
//!
//! Reference implementation of the host library contract.
//!
//! ## Overview
//!
//! This module provides:
//! - The [`Track`] model with the tags link resolution reads
//! - [`InMemoryLibrary`], a deterministic first-match catalog implementing
//!   [`MusicLibrary`](bridge_traits::MusicLibrary)

pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::InMemoryLibrary;
pub use error::{LibraryError, Result};
pub use models::Track;
