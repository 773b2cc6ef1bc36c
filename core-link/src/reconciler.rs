//! # Queue Reconciler
//!
//! Keeps the host's now-playing queue in step with the chain around the
//! playing track while shuffle is on.
//!
//! ## Track changed
//!
//! 1. Skip when shuffle is off or a listener edit is being debounced.
//! 2. Build the chain around the new track.
//! 3. If a different chain is remembered as spliced, remove as many entries
//!    as it had, all at the slot after the remembered anchor, and forget it.
//! 4. If the new chain is linked and not the remembered one, queue every
//!    chain track after the current entry, remember the chain together with
//!    the current position, then skip forward once.
//!
//! ## Queue changed
//!
//! The first notification after an engine mutation is the engine's own echo
//! and is swallowed. Any other notification is a listener edit and arms the
//! [`Debouncer`].
//!
//! Failed queue mutations end the current step with an error, but the
//! remembered splice always describes what is actually in the queue.

use crate::chain::{Chain, ChainBuilder};
use crate::debounce::{Debouncer, SuppressionTicket};
use crate::error::{LinkError, Result};
use bridge_traits::{MusicLibrary, NowPlayingQueue, PlayerControl, TrackId};
use core_runtime::LinkConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why a track change was not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    ShuffleDisabled,
    Suppressed,
}

/// A stale splice that was removed from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retraction {
    pub tracks: Vec<TrackId>,
    pub splice_anchor_index: usize,
    pub removed: usize,
}

/// What a track-changed notification did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Ignored(IgnoreReason),
    /// No chain around the track; a stale splice may have been retracted.
    Unlinked { retracted: Option<Retraction> },
    /// The chain is already in the queue.
    AlreadySpliced,
    Spliced {
        chain: Chain,
        splice_anchor_index: usize,
        retracted: Option<Retraction>,
    },
}

impl ReconcileOutcome {
    pub fn retraction(&self) -> Option<&Retraction> {
        match self {
            ReconcileOutcome::Unlinked { retracted } | ReconcileOutcome::Spliced { retracted, .. } => {
                retracted.as_ref()
            }
            _ => None,
        }
    }
}

/// What a queue-changed notification did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueChangeOutcome {
    /// Echo of the engine's own mutation.
    SelfEdit,
    /// Listener edit; linking is suppressed until `ticket` expires.
    Suppressed(SuppressionTicket),
}

#[derive(Debug, Clone)]
struct Splice {
    chain: Chain,
    anchor: usize,
}

/// Session state of the reconciler.
///
/// The remembered chain and its anchor index live in one `Option`, so one is
/// set exactly when the other is.
#[derive(Debug, Clone)]
pub struct ReconciliationState {
    splice: Option<Splice>,
    self_edit_in_flight: bool,
    debouncer: Debouncer,
}

impl ReconciliationState {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            splice: None,
            self_edit_in_flight: false,
            debouncer: Debouncer::new(debounce_window),
        }
    }

    /// Chain currently believed to be spliced into the queue.
    pub fn remembered_chain(&self) -> Option<&Chain> {
        self.splice.as_ref().map(|s| &s.chain)
    }

    /// Queue position right before the first spliced track.
    pub fn splice_anchor_index(&self) -> Option<usize> {
        self.splice.as_ref().map(|s| s.anchor)
    }

    pub fn is_suppressed(&self) -> bool {
        self.debouncer.is_suppressed()
    }

    pub fn self_edit_in_flight(&self) -> bool {
        self.self_edit_in_flight
    }
}

pub struct QueueReconciler {
    chains: ChainBuilder,
    queue: Arc<dyn NowPlayingQueue>,
    player: Arc<dyn PlayerControl>,
    state: ReconciliationState,
}

impl QueueReconciler {
    pub fn new(
        library: Arc<dyn MusicLibrary>,
        queue: Arc<dyn NowPlayingQueue>,
        player: Arc<dyn PlayerControl>,
        config: &LinkConfig,
    ) -> Self {
        Self {
            chains: ChainBuilder::new(library, config),
            queue,
            player,
            state: ReconciliationState::new(config.debounce_window),
        }
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn debounce_window(&self) -> Duration {
        self.state.debouncer.window()
    }

    /// React to a new track starting.
    pub async fn on_track_changed(&mut self, track: &TrackId) -> Result<ReconcileOutcome> {
        if !self.player.is_shuffle_enabled().await? {
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::ShuffleDisabled));
        }
        if self.state.is_suppressed() {
            debug!(track = %track, "Listener edit in progress, not linking");
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::Suppressed));
        }

        let chain = self.chains.build(track).await;

        let stale = self
            .state
            .remembered_chain()
            .is_some_and(|remembered| *remembered != chain);
        let retracted = if stale { self.retract().await? } else { None };

        if !chain.is_linked() {
            return Ok(ReconcileOutcome::Unlinked { retracted });
        }

        if self.state.remembered_chain() == Some(&chain) {
            debug!(track = %track, len = chain.len(), "Chain already spliced");
            return Ok(ReconcileOutcome::AlreadySpliced);
        }

        let splice_anchor_index = self.splice(&chain).await?;
        Ok(ReconcileOutcome::Spliced {
            chain,
            splice_anchor_index,
            retracted,
        })
    }

    /// React to the host reporting a queue mutation.
    pub fn on_queue_changed(&mut self) -> QueueChangeOutcome {
        if self.state.self_edit_in_flight {
            self.state.self_edit_in_flight = false;
            return QueueChangeOutcome::SelfEdit;
        }
        let ticket = self.state.debouncer.arm();
        debug!("Queue edited by listener, suppressing links");
        QueueChangeOutcome::Suppressed(ticket)
    }

    /// Timer for `ticket` elapsed. Returns `true` if suppression ended.
    pub fn on_debounce_elapsed(&mut self, ticket: SuppressionTicket) -> bool {
        let ended = self.state.debouncer.expire(ticket);
        if ended {
            debug!("Queue quiet again, linking resumed");
        }
        ended
    }

    /// Remove the remembered splice from the queue and forget it.
    async fn retract(&mut self) -> Result<Option<Retraction>> {
        let Some(splice) = self.state.splice.take() else {
            return Ok(None);
        };

        let expected = splice.chain.len();
        let position = splice.anchor + 1;
        let previous_flag = self.state.self_edit_in_flight;
        self.state.self_edit_in_flight = true;

        let mut removed = 0;
        while removed < expected {
            if let Err(source) = self.queue.remove_at(position).await {
                if removed == 0 {
                    self.state.self_edit_in_flight = previous_flag;
                }
                warn!(
                    removed,
                    expected, "Retraction at position {} failed: {}", position, source
                );
                return Err(LinkError::RetractionIncomplete {
                    removed,
                    expected,
                    source,
                });
            }
            removed += 1;
        }

        info!(
            anchor = splice.anchor,
            removed, "Retracted stale chain of {} tracks", expected
        );
        Ok(Some(Retraction {
            tracks: splice.chain.into_tracks(),
            splice_anchor_index: splice.anchor,
            removed,
        }))
    }

    /// Queue `chain` after the current entry and skip onto it.
    async fn splice(&mut self, chain: &Chain) -> Result<usize> {
        let anchor = self.queue.current_position().await?;
        let previous_flag = self.state.self_edit_in_flight;
        self.state.self_edit_in_flight = true;

        for (inserted, track) in chain.iter().enumerate() {
            if let Err(source) = self.queue.insert_after_current(track).await {
                if inserted == 0 {
                    self.state.self_edit_in_flight = previous_flag;
                } else {
                    self.state.splice = Some(Splice {
                        chain: chain.truncated(inserted),
                        anchor,
                    });
                }
                warn!(
                    inserted,
                    expected = chain.len(),
                    "Insert of {} failed: {}",
                    track,
                    source
                );
                return Err(LinkError::SpliceIncomplete {
                    inserted,
                    expected: chain.len(),
                    source,
                });
            }
        }

        self.state.splice = Some(Splice {
            chain: chain.clone(),
            anchor,
        });
        info!(
            anchor,
            len = chain.len(),
            "Spliced chain starting at {}",
            chain.tracks()[0]
        );

        self.player.advance_to_next_track().await?;
        Ok(anchor)
    }
}
