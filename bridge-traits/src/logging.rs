//! Host logging sink.
//!
//! Lets the host mirror the core's structured log output into its own logging
//! pipeline, such as a player log window or plugin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(BridgeError::OperationFailed(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

/// One log event as handed to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module, e.g. `core_link::reconciler`
    pub target: String,
    pub message: String,
    /// Structured fields in key order
    pub fields: BTreeMap<String, String>,
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn in_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }
}

/// Receives the core's log events.
///
/// ```ignore
/// use bridge_traits::logging::{LoggerSink, LogEntry, LogLevel};
///
/// struct PluginConsole;
///
/// #[async_trait::async_trait]
/// impl LoggerSink for PluginConsole {
///     async fn log(&self, entry: LogEntry) -> bridge_traits::error::Result<()> {
///         host_console_write(entry.level.as_str(), &entry.message);
///         Ok(())
///     }
///
///     fn accepts(&self, level: LogLevel) -> bool {
///         level >= LogLevel::Warn
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Whether events at `level` should be forwarded at all. Info and above
    /// by default.
    fn accepts(&self, level: LogLevel) -> bool {
        level >= LogLevel::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = LogEntry::new(LogLevel::Info, "core_link", "chain spliced")
            .with_field("track", "a.flac")
            .with_field("anchor", "0")
            .in_span("track_changed");

        assert_eq!(entry.target, "core_link");
        assert_eq!(entry.span.as_deref(), Some("track_changed"));
        let keys: Vec<_> = entry.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["anchor", "track"]);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
        assert!(LogLevel::Trace < LogLevel::Info);
    }

    #[test]
    fn test_entry_serializes_lowercase_level() {
        let entry = LogEntry::new(LogLevel::Warn, "core_service", "lagged");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["level"], "warn");
    }
}
