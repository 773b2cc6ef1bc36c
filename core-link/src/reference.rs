//! # Link References
//!
//! Parsing of the link syntax stored in a track's comment tag.
//!
//! A comment may carry one line per direction:
//!
//! ```text
//! Next: title=Suite Part 2;artist=Lifeformed
//! Previous: title=Suite Part 0;album=Fastfall
//! ```
//!
//! The header match is case-sensitive and must start the line. Everything
//! after the colon is a `;`-separated list of `key=value` fields; `\;` puts a
//! literal semicolon into a value. Only `title`, `artist` and `album` are
//! recognised, other keys are skipped so newer tag kinds do not break older
//! readers.

use crate::error::{LinkError, Result};
use bridge_traits::TrackField;
use core_runtime::LinkConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const FIELD_SEPARATOR: char = ';';
pub const ASSIGNMENT: char = '=';
pub const ESCAPE: char = '\\';

/// Which way a link line points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Next,
    Previous,
}

impl LinkDirection {
    /// Comment header configured for this direction.
    pub fn header(self, config: &LinkConfig) -> &str {
        match self {
            LinkDirection::Next => &config.next_header,
            LinkDirection::Previous => &config.previous_header,
        }
    }
}

/// Attribute description of a linked track.
///
/// Absent fields are wildcards when the reference is resolved. A parsed
/// reference always names at least one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkReference {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
}

impl LinkReference {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn get(&self, field: TrackField) -> Option<&str> {
        match field {
            TrackField::Title => self.title(),
            TrackField::Artist => self.artist(),
            TrackField::Album => self.album(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.album.is_none()
    }

    /// Full comment line for this reference, e.g. `Next: title=B`.
    pub fn to_link_line(&self, header: &str) -> String {
        format!("{header}: {self}")
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "title" => Some(&mut self.title),
            "artist" => Some(&mut self.artist),
            "album" => Some(&mut self.album),
            _ => None,
        }
    }
}

impl fmt::Display for LinkReference {
    /// Canonical `title=..;artist=..;album=..` form, separators escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped = |value: &str| {
            value.replace(
                FIELD_SEPARATOR,
                &format!("{ESCAPE}{FIELD_SEPARATOR}"),
            )
        };
        let fields = [
            ("title", &self.title),
            ("artist", &self.artist),
            ("album", &self.album),
        ];

        let mut first = true;
        for (key, value) in fields {
            let Some(value) = value else { continue };
            if !first {
                write!(f, "{FIELD_SEPARATOR}")?;
            }
            write!(f, "{key}{ASSIGNMENT}{}", escaped(value.as_str()))?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for LinkReference {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self> {
        parse_reference(s)
    }
}

/// Parse a `key=value;key=value` field list.
///
/// The value is everything after the first `=`, so values may contain `=`.
/// Segments without `=` and unknown keys are skipped. Fails when the input
/// has no `=` at all or names none of the recognised fields.
pub fn parse_reference(text: &str) -> Result<LinkReference> {
    let text = text.trim();
    if !text.contains(ASSIGNMENT) {
        return Err(LinkError::InvalidReference(format!(
            "no '{ASSIGNMENT}' in \"{text}\", expected e.g. \
             title{ASSIGNMENT}A{FIELD_SEPARATOR}artist{ASSIGNMENT}B"
        )));
    }

    let mut reference = LinkReference::default();
    for segment in split_fields(text) {
        let Some((key, value)) = segment.split_once(ASSIGNMENT) else {
            continue;
        };
        if let Some(slot) = reference.slot(key) {
            *slot = Some(value.to_string());
        }
    }

    if reference.is_empty() {
        return Err(LinkError::InvalidReference(format!(
            "\"{text}\" names no title, artist or album"
        )));
    }
    Ok(reference)
}

/// Split on unescaped separators, unescaping `\;` inside segments.
fn split_fields(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ESCAPE if chars.peek() == Some(&FIELD_SEPARATOR) => {
                current.push(FIELD_SEPARATOR);
                chars.next();
            }
            FIELD_SEPARATOR => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);
    segments.retain(|s| !s.is_empty());
    segments
}

/// First parseable `<header>:` line of a comment blob.
///
/// Lines that carry the header but fail to parse are skipped, so free text
/// such as `Next: see liner notes` does not hide a later valid line.
pub fn find_directional_link(header: &str, comment: &str) -> Option<LinkReference> {
    let prefix = format!("{header}:");
    comment
        .lines()
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .find_map(|rest| match parse_reference(rest) {
            Ok(reference) => Some(reference),
            Err(e) => {
                debug!(header, error = %e, "Skipping unparseable link line");
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_fields() {
        let reference = parse_reference("title=Part 2;artist=Lifeformed;album=Fastfall").unwrap();
        assert_eq!(reference.title(), Some("Part 2"));
        assert_eq!(reference.artist(), Some("Lifeformed"));
        assert_eq!(reference.album(), Some("Fastfall"));
    }

    #[test]
    fn test_escaped_separator() {
        let reference = parse_reference("title=A\\;B;artist=C").unwrap();
        assert_eq!(reference, LinkReference::default().with_title("A;B").with_artist("C"));
    }

    #[test]
    fn test_value_keeps_later_assignments() {
        let reference = parse_reference("title=x=y=z").unwrap();
        assert_eq!(reference.title(), Some("x=y=z"));
    }

    #[test]
    fn test_unknown_keys_and_empty_segments_ignored() {
        let reference = parse_reference(";;genre=Chiptune;title=A;;junk;").unwrap();
        assert_eq!(reference, LinkReference::default().with_title("A"));
    }

    #[test]
    fn test_no_assignment_is_invalid() {
        let err = parse_reference("no-equals-here").unwrap_err();
        assert!(matches!(err, LinkError::InvalidReference(_)));
    }

    #[test]
    fn test_only_unknown_keys_is_invalid() {
        let err = parse_reference("genre=Chiptune;year=2012").unwrap_err();
        assert!(matches!(err, LinkError::InvalidReference(_)));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert!(parse_reference("Title=A").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let cases = [
            LinkReference::default().with_title("A"),
            LinkReference::default().with_artist("B").with_album("C"),
            LinkReference::default()
                .with_title("Part 1")
                .with_artist("Lifeformed")
                .with_album("Fastfall"),
            LinkReference::default().with_title("Semi;colon"),
        ];
        for reference in cases {
            let text = reference.to_string();
            assert_eq!(parse_reference(&text).unwrap(), reference, "{text}");
        }
    }

    #[test]
    fn test_display_escapes_separator() {
        let reference = LinkReference::default().with_title("A;B").with_artist("C");
        assert_eq!(reference.to_string(), "title=A\\;B;artist=C");
        assert_eq!(reference.to_link_line("Next"), "Next: title=A\\;B;artist=C");
    }

    #[test]
    fn test_find_respects_direction() {
        let comment = "Next: title=X\nPrevious: title=Y";
        assert_eq!(
            find_directional_link("Next", comment),
            Some(LinkReference::default().with_title("X"))
        );
        assert_eq!(
            find_directional_link("Previous", comment),
            Some(LinkReference::default().with_title("Y"))
        );
    }

    #[test]
    fn test_find_skips_malformed_lines() {
        let comment = "Next: see liner notes\nNext:   title=X  \n";
        assert_eq!(
            find_directional_link("Next", comment),
            Some(LinkReference::default().with_title("X"))
        );
    }

    #[test]
    fn test_find_requires_line_start_and_case() {
        assert_eq!(find_directional_link("Next", "  Next: title=X"), None);
        assert_eq!(find_directional_link("Next", "next: title=X"), None);
        assert_eq!(find_directional_link("Next", "Next title=X"), None);
        assert_eq!(find_directional_link("Next", ""), None);
    }

    #[test]
    fn test_find_handles_crlf() {
        let comment = "Recorded live\r\nPrevious: album=Fastfall\r\n";
        assert_eq!(
            find_directional_link("Previous", comment),
            Some(LinkReference::default().with_album("Fastfall"))
        );
    }

    #[test]
    fn test_direction_headers_follow_config() {
        let config = LinkConfig::builder().previous_header("Prev").build().unwrap();
        assert_eq!(LinkDirection::Next.header(&config), "Next");
        assert_eq!(LinkDirection::Previous.header(&config), "Prev");
    }
}
