//! # Chain Builder
//!
//! Walks `Next:` and `Previous:` links outward from the playing track to find
//! the run of tracks that must play back to back.
//!
//! ## Walk
//!
//! Both walks start from the anchor's comment. The forward walk appends, the
//! backward walk prepends, and each stops at the first reference that
//! resolves to nothing or to a track already in the chain. The membership
//! check bounds the walk by the library size even when links form a cycle.
//!
//! Library failures never abort a walk with an error: they are logged and the
//! affected direction ends as if no link were present.

use crate::reference::{find_directional_link, LinkDirection};
use crate::resolver::TrackResolver;
use bridge_traits::{MusicLibrary, TrackId};
use core_runtime::LinkConfig;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered run of linked tracks, free of duplicates, containing its anchor.
///
/// Equality compares the track sequence only.
#[derive(Debug, Clone, Serialize)]
pub struct Chain {
    tracks: Vec<TrackId>,
    anchor_index: usize,
}

impl Chain {
    /// Chain of just the anchor.
    pub fn single(anchor: TrackId) -> Self {
        Self {
            tracks: vec![anchor],
            anchor_index: 0,
        }
    }

    /// Chain from explicit parts.
    ///
    /// Returns `None` when `tracks` is empty, contains a duplicate, or
    /// `anchor_index` is out of range.
    pub fn from_tracks(tracks: Vec<TrackId>, anchor_index: usize) -> Option<Self> {
        if anchor_index >= tracks.len() {
            return None;
        }
        let has_duplicate = tracks
            .iter()
            .enumerate()
            .any(|(i, track)| tracks[..i].contains(track));
        if has_duplicate {
            return None;
        }
        Some(Self {
            tracks,
            anchor_index,
        })
    }

    pub fn anchor(&self) -> &TrackId {
        &self.tracks[self.anchor_index]
    }

    /// Position of the anchor inside the chain.
    pub fn anchor_index(&self) -> usize {
        self.anchor_index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always `false`; a chain holds at least its anchor.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// More than the anchor alone.
    pub fn is_linked(&self) -> bool {
        self.tracks.len() > 1
    }

    pub fn contains(&self, track: &TrackId) -> bool {
        self.tracks.contains(track)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackId> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn into_tracks(self) -> Vec<TrackId> {
        self.tracks
    }

    /// First `len` tracks, anchor clamped into range. `len` must be non-zero.
    pub(crate) fn truncated(&self, len: usize) -> Self {
        let len = len.clamp(1, self.tracks.len());
        Self {
            tracks: self.tracks[..len].to_vec(),
            anchor_index: self.anchor_index.min(len - 1),
        }
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.tracks == other.tracks
    }
}

impl Eq for Chain {}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a TrackId;
    type IntoIter = std::slice::Iter<'a, TrackId>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}

/// Builds chains by following comment links through a library.
#[derive(Clone)]
pub struct ChainBuilder {
    library: Arc<dyn MusicLibrary>,
    resolver: TrackResolver,
    next_header: String,
    previous_header: String,
}

impl ChainBuilder {
    pub fn new(library: Arc<dyn MusicLibrary>, config: &LinkConfig) -> Self {
        Self {
            resolver: TrackResolver::new(library.clone(), config.match_policy),
            library,
            next_header: LinkDirection::Next.header(config).to_string(),
            previous_header: LinkDirection::Previous.header(config).to_string(),
        }
    }

    fn header(&self, direction: LinkDirection) -> &str {
        match direction {
            LinkDirection::Next => &self.next_header,
            LinkDirection::Previous => &self.previous_header,
        }
    }

    /// Build the maximal chain around `start`.
    pub async fn build(&self, start: &TrackId) -> Chain {
        let mut tracks = VecDeque::from([start.clone()]);
        let anchor_comment = self.comment_of(start).await;

        let appended = self
            .walk(LinkDirection::Next, anchor_comment.clone(), &mut tracks)
            .await;
        let prepended = self
            .walk(LinkDirection::Previous, anchor_comment, &mut tracks)
            .await;

        debug!(
            anchor = %start,
            forward = appended,
            backward = prepended,
            "Built chain"
        );

        Chain {
            tracks: tracks.into(),
            anchor_index: prepended,
        }
    }

    /// Follow one direction, returning how many tracks were added.
    async fn walk(
        &self,
        direction: LinkDirection,
        mut comment: Option<String>,
        tracks: &mut VecDeque<TrackId>,
    ) -> usize {
        let header = self.header(direction);
        let mut added = 0;

        loop {
            let Some(reference) = comment
                .as_deref()
                .and_then(|c| find_directional_link(header, c))
            else {
                break;
            };

            let linked = match self.resolver.resolve(&reference).await {
                Ok(Some(track)) => track,
                Ok(None) => {
                    debug!(reference = %reference, "{} link resolved to nothing", header);
                    break;
                }
                Err(e) => {
                    warn!(reference = %reference, "Failed to resolve {} link: {}", header, e);
                    break;
                }
            };

            if tracks.contains(&linked) {
                debug!(track = %linked, "{} link revisits chain, stopping", header);
                break;
            }

            comment = self.comment_of(&linked).await;
            match direction {
                LinkDirection::Next => tracks.push_back(linked),
                LinkDirection::Previous => tracks.push_front(linked),
            }
            added += 1;
        }

        added
    }

    async fn comment_of(&self, track: &TrackId) -> Option<String> {
        match self.library.comment(track).await {
            Ok(comment) => comment,
            Err(e) => {
                warn!(track = %track, "Failed to read comment: {}", e);
                None
            }
        }
    }
}
