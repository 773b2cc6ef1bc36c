//! # Link Configuration
//!
//! Settings for the shuffle-link engine.
//!
//! ## Overview
//!
//! The configuration uses a builder to construct a [`LinkConfig`] and
//! validates it on [`build()`](LinkConfigBuilder::build), failing fast with an
//! actionable message when a value is out of range.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::LinkConfig;
//! use std::time::Duration;
//!
//! let config = LinkConfig::builder()
//!     .debounce_window(Duration::from_millis(500))
//!     .previous_header("Prev")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.next_header, "Next");
//! ```
//!
//! Hosts that keep settings in a file can deserialize the same structure; the
//! window is spelled `debounce_window_ms` there:
//!
//! ```
//! use core_runtime::config::LinkConfig;
//!
//! let config: LinkConfig =
//!     serde_json::from_str(r#"{ "debounce_window_ms": 400, "previous_header": "Prev" }"#).unwrap();
//! config.validate().unwrap();
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiescence window after a listener edit. 500 ms misses rapid track skips.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// Upper bound accepted for the debounce window.
pub const MAX_DEBOUNCE_WINDOW: Duration = Duration::from_secs(5);

pub const DEFAULT_NEXT_HEADER: &str = "Next";
pub const DEFAULT_PREVIOUS_HEADER: &str = "Previous";

/// How link references are turned into library queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    /// Every named field must match (AND) instead of any of them (OR).
    pub match_all: bool,
    /// Fields must match exactly instead of by substring.
    pub exact: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            match_all: true,
            exact: true,
        }
    }
}

/// Shuffle-link engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// How long linking stays suppressed after a listener edits the queue.
    #[serde(rename = "debounce_window_ms", with = "duration_ms")]
    pub debounce_window: Duration,

    /// Comment line header introducing the following track (`Next:`).
    pub next_header: String,

    /// Comment line header introducing the preceding track (`Previous:`).
    pub previous_header: String,

    /// Resolution policy for link references.
    pub match_policy: MatchPolicy,

    /// Per-subscriber buffer of the event bus.
    pub event_buffer_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            next_header: DEFAULT_NEXT_HEADER.to_string(),
            previous_header: DEFAULT_PREVIOUS_HEADER.to_string(),
            match_policy: MatchPolicy::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl LinkConfig {
    pub fn builder() -> LinkConfigBuilder {
        LinkConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Debounce window is within 1 ms ..= 5 s
    /// - Headers are non-empty single-line words without `:`
    /// - Next and previous headers differ
    /// - Event buffer is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.debounce_window < Duration::from_millis(1) {
            return Err(Error::Config(
                "Debounce window must be at least 1 ms".to_string(),
            ));
        }

        if self.debounce_window > MAX_DEBOUNCE_WINDOW {
            return Err(Error::Config(format!(
                "Debounce window exceeds maximum of {} ms",
                MAX_DEBOUNCE_WINDOW.as_millis()
            )));
        }

        validate_header("next_header", &self.next_header)?;
        validate_header("previous_header", &self.previous_header)?;

        if self.next_header == self.previous_header {
            return Err(Error::Config(format!(
                "next_header and previous_header must differ (both are '{}')",
                self.next_header
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_header(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", name)));
    }
    if value.contains(':') || value.contains('\n') || value.contains('\r') {
        return Err(Error::Config(format!(
            "{} must be a single word without ':' (got '{}')",
            name, value
        )));
    }
    Ok(())
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Builder for [`LinkConfig`].
#[derive(Debug, Default)]
pub struct LinkConfigBuilder {
    debounce_window: Option<Duration>,
    next_header: Option<String>,
    previous_header: Option<String>,
    match_policy: Option<MatchPolicy>,
    event_buffer_size: Option<usize>,
}

impl LinkConfigBuilder {
    /// Sets the suppression window after listener edits.
    ///
    /// Default: 250 ms
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = Some(window);
        self
    }

    /// Sets the header of forward links. Default: `Next`
    pub fn next_header(mut self, header: impl Into<String>) -> Self {
        self.next_header = Some(header.into());
        self
    }

    /// Sets the header of backward links. Default: `Previous`
    pub fn previous_header(mut self, header: impl Into<String>) -> Self {
        self.previous_header = Some(header.into());
        self
    }

    /// Sets the resolution policy. Default: match all fields, exactly.
    pub fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = Some(policy);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds and validates the final configuration.
    pub fn build(self) -> Result<LinkConfig> {
        let defaults = LinkConfig::default();
        let config = LinkConfig {
            debounce_window: self.debounce_window.unwrap_or(defaults.debounce_window),
            next_header: self.next_header.unwrap_or(defaults.next_header),
            previous_header: self.previous_header.unwrap_or(defaults.previous_header),
            match_policy: self.match_policy.unwrap_or(defaults.match_policy),
            event_buffer_size: self.event_buffer_size.unwrap_or(defaults.event_buffer_size),
        };

        config.validate()?;

        Ok(config)
    }
}
