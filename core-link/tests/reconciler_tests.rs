//! Reconciler scenarios against the in-memory library and queue

use bridge_traits::TrackId;
use core_library::{InMemoryLibrary, Track};
use core_link::{IgnoreReason, QueueChangeOutcome, QueueReconciler, ReconcileOutcome};
use core_playback::{InMemoryQueue, QueueMutation};
use core_runtime::LinkConfig;
use std::sync::Arc;

struct Harness {
    queue: Arc<InMemoryQueue>,
    reconciler: QueueReconciler,
}

impl Harness {
    /// Library a -> b -> c, e -> b, plus unrelated d, x, y; queue [x, a, d, y].
    fn new() -> Self {
        let library = InMemoryLibrary::with_tracks([
            Track::new("a").with_title("A").with_comment("Next: title=B"),
            Track::new("b")
                .with_title("B")
                .with_comment("Previous: title=A\nNext: title=C"),
            Track::new("c").with_title("C").with_comment("Previous: title=B"),
            Track::new("d").with_title("D"),
            Track::new("e").with_title("E").with_comment("Next: title=B"),
            Track::new("x").with_title("X"),
            Track::new("y").with_title("Y"),
        ])
        .unwrap();
        let queue = Arc::new(InMemoryQueue::with_tracks(["x", "a", "d", "y"]).with_shuffle(true));
        let reconciler = QueueReconciler::new(
            Arc::new(library),
            queue.clone(),
            queue.clone(),
            &LinkConfig::default(),
        );
        Self { queue, reconciler }
    }

    fn entries(&self) -> Vec<String> {
        self.queue.entries().iter().map(|t| t.to_string()).collect()
    }

    /// Jump as the listener would and report the resulting track change.
    async fn play(&mut self, position: usize) -> ReconcileOutcome {
        let track = self.queue.play_at(position).unwrap();
        self.reconciler.on_track_changed(&track).await.unwrap()
    }
}

#[tokio::test]
async fn test_splice_inserts_chain_and_advances() {
    let mut h = Harness::new();
    let outcome = h.play(1).await;

    let ReconcileOutcome::Spliced {
        chain,
        splice_anchor_index,
        retracted,
    } = outcome
    else {
        panic!("expected a splice");
    };
    assert_eq!(splice_anchor_index, 1);
    assert!(retracted.is_none());
    assert_eq!(chain.len(), 3);

    assert_eq!(h.entries(), ["x", "a", "a", "b", "c", "d", "y"]);
    assert_eq!(h.queue.current_track(), Some(TrackId::from("a")));

    let state = h.reconciler.state();
    assert_eq!(state.remembered_chain(), Some(&chain));
    assert_eq!(state.splice_anchor_index(), Some(1));
    assert!(state.self_edit_in_flight());

    let journal = h.queue.take_mutations();
    assert_eq!(journal.len(), 4);
    assert_eq!(journal[3], QueueMutation::Advanced { from: 1, to: 2 });
}

#[tokio::test]
async fn test_playing_through_spliced_chain_is_a_no_op() {
    let mut h = Harness::new();
    h.play(1).await;
    assert_eq!(h.reconciler.on_queue_changed(), QueueChangeOutcome::SelfEdit);
    h.queue.take_mutations();

    // Track change caused by the engine's own skip, then natural progression
    for position in 2..=4 {
        let track = h.queue.play_at(position).unwrap();
        let outcome = h.reconciler.on_track_changed(&track).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::AlreadySpliced, "at {position}");
    }
    assert!(h.queue.mutations().is_empty());
}

#[tokio::test]
async fn test_shuffling_away_retracts_whole_splice() {
    let mut h = Harness::new();
    h.play(1).await;
    h.reconciler.on_queue_changed();
    h.queue.take_mutations();

    // d sits at 5 after the splice
    let outcome = h.play(5).await;
    let retraction = outcome.retraction().cloned().unwrap();
    assert!(matches!(outcome, ReconcileOutcome::Unlinked { .. }));
    assert_eq!(retraction.removed, 3);
    assert_eq!(retraction.splice_anchor_index, 1);

    assert_eq!(h.entries(), ["x", "a", "d", "y"]);
    assert_eq!(h.queue.current_track(), Some(TrackId::from("d")));
    assert!(h
        .queue
        .mutations()
        .iter()
        .all(|m| matches!(m, QueueMutation::Removed { position: 2, .. })));

    let state = h.reconciler.state();
    assert!(state.remembered_chain().is_none());
    assert!(state.splice_anchor_index().is_none());
}

#[tokio::test]
async fn test_landing_mid_chain_resplices_from_there() {
    let mut h = Harness::new();
    h.queue.push("b");
    h.queue.push("c");

    // Listener shuffles straight onto c; the backward walk finds a and b
    let outcome = h.play(5).await;
    let ReconcileOutcome::Spliced { chain, .. } = outcome else {
        panic!("expected a splice");
    };
    assert_eq!(chain.anchor_index(), 2);
    let order: Vec<_> = chain.iter().map(|t| t.as_str()).collect();
    assert_eq!(order, ["a", "b", "c"]);

    assert_eq!(h.entries(), ["x", "a", "d", "y", "b", "c", "a", "b", "c"]);
    assert_eq!(h.queue.current_track(), Some(TrackId::from("a")));
}

#[tokio::test]
async fn test_different_chain_replaces_remembered_one() {
    let mut h = Harness::new();
    h.queue.push("e");
    h.play(1).await;
    h.reconciler.on_queue_changed();

    // e links into b, so its chain [e, b, c] overlaps but differs
    let outcome = h.play(7).await;
    let ReconcileOutcome::Spliced {
        chain,
        splice_anchor_index,
        retracted: Some(retraction),
    } = outcome
    else {
        panic!("expected retraction then splice");
    };
    assert_eq!(retraction.removed, 3);
    assert_eq!(splice_anchor_index, 4);
    assert_eq!(h.reconciler.state().remembered_chain(), Some(&chain));
    assert_eq!(h.entries(), ["x", "a", "d", "y", "e", "e", "b", "c"]);
}

#[tokio::test]
async fn test_listener_edit_suppresses_linking() {
    let mut h = Harness::new();
    let outcome = h.reconciler.on_queue_changed();
    let QueueChangeOutcome::Suppressed(ticket) = outcome else {
        panic!("expected suppression");
    };

    assert_eq!(h.play(1).await, ReconcileOutcome::Ignored(IgnoreReason::Suppressed));
    assert!(h.queue.mutations().is_empty());

    assert!(h.reconciler.on_debounce_elapsed(ticket));
    assert!(matches!(h.play(1).await, ReconcileOutcome::Spliced { .. }));
}

#[tokio::test]
async fn test_shuffle_off_leaves_queue_alone() {
    let mut h = Harness::new();
    h.queue.set_shuffle(false);
    assert_eq!(
        h.play(1).await,
        ReconcileOutcome::Ignored(IgnoreReason::ShuffleDisabled)
    );
    assert_eq!(h.entries(), ["x", "a", "d", "y"]);
}

#[tokio::test]
async fn test_unlinked_track_without_splice_does_nothing() {
    let mut h = Harness::new();
    let outcome = h.play(2).await;
    assert_eq!(outcome, ReconcileOutcome::Unlinked { retracted: None });
    assert!(h.queue.mutations().is_empty());
}
