//! Music library lookup contracts.
//!
//! The linking core never walks the host's library storage directly. It asks
//! two questions through [`MusicLibrary`]: "what is the free-text comment of
//! this track?" and "which track is the first match for this attribute
//! query?". Everything else about the library (scanning, tags on disk,
//! databases) stays on the host side of the bridge.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle identifying a track in the host library.
///
/// Hosts typically hand out file URLs or database keys. The core only ever
/// compares identifiers for exact equality and passes them back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Track attribute that a [`Condition`] constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackField {
    Artist,
    Album,
    Title,
}

impl TrackField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackField::Artist => "artist",
            TrackField::Album => "album",
            TrackField::Title => "title",
        }
    }
}

/// How a condition compares the stored tag with the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Tag must equal the value.
    Is,
    /// Tag must contain the value as a substring.
    Contains,
}

/// How the conditions of a query are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineMethod {
    /// Every condition must hold.
    All,
    /// At least one condition must hold.
    Any,
}

/// A single attribute constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: TrackField,
    pub comparison: Comparison,
    pub value: String,
}

impl Condition {
    pub fn new(field: TrackField, comparison: Comparison, value: impl Into<String>) -> Self {
        Self {
            field,
            comparison,
            value: value.into(),
        }
    }

    /// Evaluate the condition against a tag value. Absent tags never match.
    pub fn matches(&self, tag: Option<&str>) -> bool {
        let Some(tag) = tag else {
            return false;
        };
        match self.comparison {
            Comparison::Is => tag == self.value,
            Comparison::Contains => tag.contains(self.value.as_str()),
        }
    }
}

/// Attribute query over artist, album and title.
///
/// Only the fields a link reference names are constrained; a query with no
/// conditions is considered empty and hosts should return no match for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackQuery {
    pub combine: CombineMethod,
    pub conditions: Vec<Condition>,
}

impl TrackQuery {
    pub fn new(combine: CombineMethod) -> Self {
        Self {
            combine,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the query against a set of tag lookups.
    ///
    /// `tag` returns the stored value for a field, if the track has one.
    pub fn matches<'a, F>(&self, tag: F) -> bool
    where
        F: Fn(TrackField) -> Option<&'a str>,
    {
        if self.is_empty() {
            return false;
        }
        let mut results = self.conditions.iter().map(|c| c.matches(tag(c.field)));
        match self.combine {
            CombineMethod::All => results.all(|hit| hit),
            CombineMethod::Any => results.any(|hit| hit),
        }
    }
}

/// Library lookups the linking core depends on.
///
/// # Ordering
///
/// `query_first_match` must be deterministic: for an unchanged library and an
/// identical query it returns the same track every time. Implementations
/// document the total order they use to pick the first result (the bundled
/// in-memory library uses insertion order).
#[async_trait]
pub trait MusicLibrary: Send + Sync {
    /// Free-text comment blob of a track, or `None` when the tag is absent.
    async fn comment(&self, track: &TrackId) -> Result<Option<String>>;

    /// First track satisfying `query`, or `None` when nothing matches.
    async fn query_first_match(&self, query: &TrackQuery) -> Result<Option<TrackId>>;
}
