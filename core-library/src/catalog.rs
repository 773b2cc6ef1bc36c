//! In-memory track catalog.
//!
//! A reference [`MusicLibrary`] for hosts that do not expose their own search
//! API, and the library used throughout the test suites.
//!
//! # Ordering
//!
//! `query_first_match` scans tracks in insertion order and returns the first
//! hit, so the result for a given query only changes when the catalog does.

use crate::error::{LibraryError, Result};
use crate::models::Track;
use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{MusicLibrary, TrackId, TrackQuery};
use parking_lot::RwLock;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct InMemoryLibrary {
    tracks: RwLock<Vec<Track>>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `tracks`, rejecting invalid or duplicate entries.
    pub fn with_tracks<I>(tracks: I) -> Result<Self>
    where
        I: IntoIterator<Item = Track>,
    {
        let library = Self::new();
        for track in tracks {
            library.insert(track)?;
        }
        Ok(library)
    }

    /// Append a track. Later tracks lose first-match ties to earlier ones.
    pub fn insert(&self, track: Track) -> Result<()> {
        track.validate().map_err(|message| LibraryError::InvalidInput {
            field: "track".to_string(),
            message,
        })?;

        let mut tracks = self.tracks.write();
        if tracks.iter().any(|t| t.id == track.id) {
            return Err(LibraryError::Duplicate(track.id.to_string()));
        }
        debug!(track = %track.id, "Catalog insert");
        tracks.push(track);
        Ok(())
    }

    /// Replace the comment tag of an existing track.
    pub fn set_comment(&self, id: &TrackId, comment: Option<String>) -> Result<()> {
        let mut tracks = self.tracks.write();
        let track = tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: "track".to_string(),
                id: id.to_string(),
            })?;
        track.comment = comment;
        Ok(())
    }

    /// Remove a track, returning whether it was present.
    pub fn remove(&self, id: &TrackId) -> bool {
        let mut tracks = self.tracks.write();
        let before = tracks.len();
        tracks.retain(|t| &t.id != id);
        tracks.len() != before
    }

    pub fn get(&self, id: &TrackId) -> Option<Track> {
        self.tracks.read().iter().find(|t| &t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tracks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }

    /// First track matching `query`, in insertion order.
    pub fn find_first(&self, query: &TrackQuery) -> Option<TrackId> {
        self.tracks
            .read()
            .iter()
            .find(|track| query.matches(|field| track.tag(field)))
            .map(|track| track.id.clone())
    }
}

#[async_trait]
impl MusicLibrary for InMemoryLibrary {
    async fn comment(&self, track: &TrackId) -> BridgeResult<Option<String>> {
        let comment = self
            .tracks
            .read()
            .iter()
            .find(|t| &t.id == track)
            .and_then(|t| t.comment.clone());
        trace!(track = %track, has_comment = comment.is_some(), "Comment lookup");
        Ok(comment)
    }

    async fn query_first_match(&self, query: &TrackQuery) -> BridgeResult<Option<TrackId>> {
        Ok(self.find_first(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{CombineMethod, Comparison, Condition, TrackField};

    fn catalog() -> InMemoryLibrary {
        InMemoryLibrary::with_tracks([
            Track::new("a")
                .with_title("Suite Part 1")
                .with_artist("Lifeformed")
                .with_comment("Next: title=Suite Part 2"),
            Track::new("b")
                .with_title("Suite Part 2")
                .with_artist("Lifeformed"),
            Track::new("c")
                .with_title("Suite Part 2")
                .with_artist("Someone Else"),
        ])
        .unwrap()
    }

    fn title_is(value: &str) -> TrackQuery {
        TrackQuery::new(CombineMethod::All)
            .with_condition(Condition::new(TrackField::Title, Comparison::Is, value))
    }

    #[tokio::test]
    async fn test_first_match_uses_insertion_order() {
        let library = catalog();
        let hit = library.query_first_match(&title_is("Suite Part 2")).await.unwrap();
        assert_eq!(hit, Some(TrackId::from("b")));

        // Same query, same answer
        let again = library.query_first_match(&title_is("Suite Part 2")).await.unwrap();
        assert_eq!(hit, again);
    }

    #[tokio::test]
    async fn test_all_conditions_narrow_the_match() {
        let library = catalog();
        let query = title_is("Suite Part 2").with_condition(Condition::new(
            TrackField::Artist,
            Comparison::Is,
            "Someone Else",
        ));
        let hit = library.query_first_match(&query).await.unwrap();
        assert_eq!(hit, Some(TrackId::from("c")));
    }

    #[tokio::test]
    async fn test_no_match_and_empty_query() {
        let library = catalog();
        assert_eq!(library.query_first_match(&title_is("Missing")).await.unwrap(), None);
        assert_eq!(
            library
                .query_first_match(&TrackQuery::new(CombineMethod::Any))
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_comment_lookup() {
        let library = catalog();
        assert_eq!(
            library.comment(&TrackId::from("a")).await.unwrap().as_deref(),
            Some("Next: title=Suite Part 2")
        );
        assert_eq!(library.comment(&TrackId::from("b")).await.unwrap(), None);
        assert_eq!(library.comment(&TrackId::from("zzz")).await.unwrap(), None);
    }

    #[test]
    fn test_insert_rejects_duplicates_and_invalid() {
        let library = catalog();
        let dup = library.insert(Track::new("a").with_title("again"));
        assert!(matches!(dup, Err(LibraryError::Duplicate(_))));

        let invalid = library.insert(Track::new("d"));
        assert!(matches!(invalid, Err(LibraryError::InvalidInput { .. })));
        assert_eq!(library.len(), 3);
    }

    #[test]
    fn test_set_comment_and_remove() {
        let library = catalog();
        let b = TrackId::from("b");
        library
            .set_comment(&b, Some("Previous: title=Suite Part 1".into()))
            .unwrap();
        assert!(library.get(&b).unwrap().comment.is_some());

        assert!(library.remove(&b));
        assert!(!library.remove(&b));
        assert!(matches!(
            library.set_comment(&b, None),
            Err(LibraryError::NotFound { .. })
        ));
    }
}
