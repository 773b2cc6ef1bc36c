//! Turns link references into library tracks.

use crate::error::Result;
use crate::reference::LinkReference;
use bridge_traits::{CombineMethod, Comparison, Condition, MusicLibrary, TrackField, TrackId, TrackQuery};
use core_runtime::MatchPolicy;
use std::sync::Arc;
use tracing::trace;

/// Field order of generated queries.
const QUERY_FIELDS: [TrackField; 3] = [TrackField::Artist, TrackField::Album, TrackField::Title];

/// Build the library query for `reference`.
///
/// Only fields the reference names become conditions, so absent fields act
/// as wildcards.
pub fn build_query(reference: &LinkReference, policy: MatchPolicy) -> TrackQuery {
    let combine = if policy.match_all {
        CombineMethod::All
    } else {
        CombineMethod::Any
    };
    let comparison = if policy.exact {
        Comparison::Is
    } else {
        Comparison::Contains
    };

    QUERY_FIELDS
        .into_iter()
        .filter_map(|field| {
            reference
                .get(field)
                .map(|value| Condition::new(field, comparison, value))
        })
        .fold(TrackQuery::new(combine), TrackQuery::with_condition)
}

/// Resolves references against a [`MusicLibrary`] with a fixed policy.
///
/// The first result reported by the library wins; ordering is whatever the
/// library guarantees for `query_first_match`.
#[derive(Clone)]
pub struct TrackResolver {
    library: Arc<dyn MusicLibrary>,
    policy: MatchPolicy,
}

impl TrackResolver {
    pub fn new(library: Arc<dyn MusicLibrary>, policy: MatchPolicy) -> Self {
        Self { library, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub async fn resolve(&self, reference: &LinkReference) -> Result<Option<TrackId>> {
        let query = build_query(reference, self.policy);
        if query.is_empty() {
            return Ok(None);
        }
        let track = self.library.query_first_match(&query).await?;
        trace!(reference = %reference, resolved = ?track, "Resolved link reference");
        Ok(track)
    }
}
