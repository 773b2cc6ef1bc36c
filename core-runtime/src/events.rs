//! # Event Bus System
//!
//! Typed events flowing between the host player and the shuffle-link engine,
//! carried on a `tokio::sync::broadcast` channel.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────┐  PlayerEvent  ┌───────────┐  PlayerEvent  ┌──────────────────┐
//! │ Host player ├──────────────>│           ├──────────────>│ ShuffleLink      │
//! └─────────────┘               │ EventBus  │               │ service          │
//!                               │ (broadcast│   LinkEvent   │                  │
//! ┌─────────────┐   LinkEvent   │  channel) │<──────────────┤                  │
//! │ Subscribers │<──────────────┤           │               └──────────────────┘
//! └─────────────┘               └───────────┘
//! ```
//!
//! - [`PlayerEvent`]s are the inbound notifications: the playing track changed,
//!   or the now-playing list changed.
//! - [`LinkEvent`]s report what the engine did about them.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
//! use bridge_traits::TrackId;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Player(PlayerEvent::TrackChanged {
//!     track: TrackId::from("file:///music/part1.flac"),
//! }))
//! .ok();
//!
//! let received = rx.recv().await.unwrap();
//! assert!(matches!(received, CoreEvent::Player(_)));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender is gone; treat as shutdown.

use bridge_traits::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Notifications coming from the host player
    Player(PlayerEvent),
    /// Actions taken by the linking engine
    Link(LinkEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Player(e) => e.description(),
            CoreEvent::Link(e) => e.description(),
        }
    }
}

// ============================================================================
// Player Events
// ============================================================================

/// Notifications raised by the host player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    /// A different track started playing.
    TrackChanged {
        /// The track now playing.
        track: TrackId,
    },
    /// The now-playing list was modified, by the listener or by the engine.
    QueueChanged,
}

impl PlayerEvent {
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::TrackChanged { .. } => "Track changed",
            PlayerEvent::QueueChanged => "Now-playing list changed",
        }
    }
}

// ============================================================================
// Link Events
// ============================================================================

/// Actions the linking engine performed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LinkEvent {
    /// A chain of linked tracks was inserted after the current entry.
    ChainSpliced {
        /// Track whose change triggered discovery.
        anchor: TrackId,
        /// Tracks inserted, in queue order.
        tracks: Vec<TrackId>,
        /// Queue position immediately before the first inserted track.
        splice_anchor_index: usize,
    },
    /// A previously spliced chain was removed from the queue.
    ChainRetracted {
        /// The chain that had been spliced.
        tracks: Vec<TrackId>,
        /// Number of queue entries actually removed.
        removed: usize,
    },
    /// A listener edit opened the suppression window.
    SuppressionStarted,
    /// The suppression window elapsed without further edits.
    SuppressionEnded,
    /// A reconciliation step was abandoned.
    ReconcileFailed {
        /// Human-readable error message.
        message: String,
    },
}

impl LinkEvent {
    pub fn description(&self) -> &str {
        match self {
            LinkEvent::ChainSpliced { .. } => "Linked chain spliced into queue",
            LinkEvent::ChainRetracted { .. } => "Linked chain retracted from queue",
            LinkEvent::SuppressionStarted => "Linking suppressed after queue edit",
            LinkEvent::SuppressionEnded => "Linking resumed",
            LinkEvent::ReconcileFailed { .. } => "Reconciliation failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender; every `subscribe()` creates an
/// independent receiver that sees all future events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let player_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Player(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter; rejected events are consumed.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking [`recv`](Self::recv); `None` once nothing matching is buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(missed)) => return Some(Err(RecvError::Lagged(missed))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            };
            if self.accepts(&event) {
                return Some(Ok(event));
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn track_changed(id: &str) -> CoreEvent {
        CoreEvent::Player(PlayerEvent::TrackChanged {
            track: TrackId::from(id),
        })
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(track_changed("a")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = CoreEvent::Link(LinkEvent::ChainSpliced {
            anchor: TrackId::from("a"),
            tracks: vec![TrackId::from("a"), TrackId::from("b")],
            splice_anchor_index: 3,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|event| matches!(event, CoreEvent::Player(_)));

        bus.emit(CoreEvent::Link(LinkEvent::SuppressionStarted)).ok();
        bus.emit(CoreEvent::Player(PlayerEvent::QueueChanged)).ok();

        let received = stream.recv().await.unwrap();
        assert_eq!(received, CoreEvent::Player(PlayerEvent::QueueChanged));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut stream = EventStream::new(bus.subscribe());

        for id in ["a", "b", "c", "d"] {
            bus.emit(track_changed(id)).ok();
        }

        match stream.try_recv() {
            Some(Err(RecvError::Lagged(n))) => assert_eq!(n, 2),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(stream.try_recv().unwrap().unwrap(), track_changed("c"));
    }

    #[test]
    fn test_event_description() {
        let failed = CoreEvent::Link(LinkEvent::ReconcileFailed {
            message: "remove failed".into(),
        });
        assert_eq!(failed.description(), "Reconciliation failed");
        assert_eq!(
            CoreEvent::Player(PlayerEvent::QueueChanged).description(),
            "Now-playing list changed"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = track_changed("file:///a.flac");
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Player\""));
        assert!(json.contains("\"event\":\"TrackChanged\""));
        assert!(json.contains("file:///a.flac"));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
