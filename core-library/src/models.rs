//! Domain models for the music library
//!
//! Only the tags the linking engine reads are modelled: title, artist, album
//! and the free-text comment where link lines live.

use bridge_traits::{TrackField, TrackId};
use serde::{Deserialize, Serialize};

/// Music track with the tags relevant to linking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Host identifier (file URL or database key)
    pub id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Free-text comment tag, possibly spanning several lines
    pub comment: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<TrackId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            artist: None,
            album: None,
            comment: None,
        }
    }

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

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Stored value of a searchable tag.
    pub fn tag(&self, field: TrackField) -> Option<&str> {
        match field {
            TrackField::Title => self.title.as_deref(),
            TrackField::Artist => self.artist.as_deref(),
            TrackField::Album => self.album.as_deref(),
        }
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Track id cannot be empty".to_string());
        }

        if self.title.is_none() && self.artist.is_none() && self.album.is_none() {
            return Err(format!(
                "Track {} needs at least one of title, artist or album",
                self.id
            ));
        }

        Ok(())
    }
}
