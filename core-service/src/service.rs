//! # Shuffle-Link Service
//!
//! Owns the queue reconciler for one player session and connects it to the
//! event bus.
//!
//! ## Overview
//!
//! - Player notifications arrive either through [`ShuffleLinkService::handle_event`]
//!   or from the bus via [`ShuffleLinkService::run`].
//! - The reconciler sits behind one async mutex, so exactly one notification
//!   or timer expiry is processed at a time.
//! - Listener edits arm a debounce timer on the tokio runtime; only the most
//!   recently armed timer ends suppression.
//! - Every splice, retraction, suppression change and failure is published
//!   as a [`LinkEvent`].
//!
//! ## Usage
//!
//! ```rust
//! use core_library::{InMemoryLibrary, Track};
//! use core_playback::InMemoryQueue;
//! use core_runtime::events::PlayerEvent;
//! use core_service::ShuffleLinkService;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> core_service::Result<()> {
//! let library = InMemoryLibrary::with_tracks([
//!     Track::new("a").with_title("A").with_comment("Next: title=B"),
//!     Track::new("b").with_title("B"),
//! ])
//! .unwrap();
//! let queue = Arc::new(InMemoryQueue::with_tracks(["a"]).with_shuffle(true));
//!
//! let service = ShuffleLinkService::builder()
//!     .library(Arc::new(library))
//!     .queue_and_player(queue.clone())
//!     .build()?;
//!
//! service
//!     .handle_event(&PlayerEvent::TrackChanged { track: "a".into() })
//!     .await?;
//! assert_eq!(queue.len(), 3);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use bridge_traits::{MusicLibrary, NowPlayingQueue, PlayerControl, TrackId};
use core_link::{Chain, QueueChangeOutcome, QueueReconciler, ReconcileOutcome, SuppressionTicket};
use core_runtime::events::{CoreEvent, EventBus, EventStream, LinkEvent, PlayerEvent, RecvError};
use core_runtime::logging::strip_path;
use core_runtime::{Error as RuntimeError, LinkConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Host collaborators the engine needs.
pub struct LinkDependencies {
    pub library: Arc<dyn MusicLibrary>,
    pub queue: Arc<dyn NowPlayingQueue>,
    pub player: Arc<dyn PlayerControl>,
}

impl LinkDependencies {
    pub fn new(
        library: Arc<dyn MusicLibrary>,
        queue: Arc<dyn NowPlayingQueue>,
        player: Arc<dyn PlayerControl>,
    ) -> Self {
        Self {
            library,
            queue,
            player,
        }
    }
}

struct ServiceInner {
    reconciler: Mutex<QueueReconciler>,
    event_bus: EventBus,
    config: LinkConfig,
}

impl ServiceInner {
    fn publish(&self, event: LinkEvent) {
        debug!("{}", event.description());
        self.event_bus.emit(CoreEvent::Link(event)).ok();
    }
}

/// Primary façade exposed to host players.
#[derive(Clone)]
pub struct ShuffleLinkService {
    inner: Arc<ServiceInner>,
}

impl ShuffleLinkService {
    /// Create a service with its own event bus.
    pub fn new(deps: LinkDependencies, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        let event_bus = EventBus::new(config.event_buffer_size);
        Ok(Self::assemble(deps, config, event_bus))
    }

    pub fn builder() -> ShuffleLinkServiceBuilder {
        ShuffleLinkServiceBuilder::default()
    }

    fn assemble(deps: LinkDependencies, config: LinkConfig, event_bus: EventBus) -> Self {
        let reconciler = QueueReconciler::new(deps.library, deps.queue, deps.player, &config);
        Self {
            inner: Arc::new(ServiceInner {
                reconciler: Mutex::new(reconciler),
                event_bus,
                config,
            }),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn config(&self) -> &LinkConfig {
        &self.inner.config
    }

    /// Chain currently spliced into the queue, if any.
    pub async fn remembered_chain(&self) -> Option<Chain> {
        self.inner
            .reconciler
            .lock()
            .await
            .state()
            .remembered_chain()
            .cloned()
    }

    /// Whether linking is paused after a listener edit.
    pub async fn is_suppressed(&self) -> bool {
        self.inner.reconciler.lock().await.state().is_suppressed()
    }

    /// Process one player notification.
    ///
    /// Errors are fatal to this notification only; the engine state stays
    /// consistent and later notifications are processed normally.
    #[instrument(skip(self))]
    pub async fn handle_event(&self, event: &PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::TrackChanged { track } => {
                self.track_changed(track).await?;
            }
            PlayerEvent::QueueChanged => {
                self.queue_changed().await;
            }
        }
        Ok(())
    }

    /// Reconcile the queue for a newly playing track.
    #[instrument(skip(self, track), fields(track = %strip_path(track.as_str())))]
    pub async fn track_changed(&self, track: &TrackId) -> Result<ReconcileOutcome> {
        let mut reconciler = self.inner.reconciler.lock().await;
        match reconciler.on_track_changed(track).await {
            Ok(outcome) => {
                self.publish_outcome(track, &outcome);
                Ok(outcome)
            }
            Err(e) => {
                warn!("Reconciliation abandoned: {}", e);
                self.inner.publish(LinkEvent::ReconcileFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Record a now-playing list change.
    pub async fn queue_changed(&self) -> QueueChangeOutcome {
        let mut reconciler = self.inner.reconciler.lock().await;
        let was_suppressed = reconciler.state().is_suppressed();
        let outcome = reconciler.on_queue_changed();

        if let QueueChangeOutcome::Suppressed(ticket) = outcome {
            if !was_suppressed {
                self.inner.publish(LinkEvent::SuppressionStarted);
            }
            self.schedule_expiry(ticket, reconciler.debounce_window());
        }
        outcome
    }

    fn schedule_expiry(&self, ticket: SuppressionTicket, window: Duration) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let ended = inner.reconciler.lock().await.on_debounce_elapsed(ticket);
            if ended {
                inner.publish(LinkEvent::SuppressionEnded);
            }
        });
    }

    fn publish_outcome(&self, track: &TrackId, outcome: &ReconcileOutcome) {
        if let Some(retraction) = outcome.retraction() {
            self.inner.publish(LinkEvent::ChainRetracted {
                tracks: retraction.tracks.clone(),
                removed: retraction.removed,
            });
        }

        match outcome {
            ReconcileOutcome::Spliced {
                chain,
                splice_anchor_index,
                ..
            } => {
                info!(
                    "Spliced {} linked tracks after position {}",
                    chain.len(),
                    splice_anchor_index
                );
                self.inner.publish(LinkEvent::ChainSpliced {
                    anchor: track.clone(),
                    tracks: chain.tracks().to_vec(),
                    splice_anchor_index: *splice_anchor_index,
                });
            }
            ReconcileOutcome::Ignored(reason) => debug!(?reason, "Track change ignored"),
            ReconcileOutcome::Unlinked { .. } | ReconcileOutcome::AlreadySpliced => {}
        }
    }

    /// Drive the engine from player events on `stream` until the bus closes.
    pub async fn run(&self, mut stream: EventStream) {
        info!("Shuffle-link service listening for player events");
        loop {
            match stream.recv().await {
                Ok(CoreEvent::Player(event)) => {
                    // Already logged and published as ReconcileFailed
                    let _ = self.handle_event(&event).await;
                }
                Ok(CoreEvent::Link(_)) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!("Missed {} player events, state may lag the queue", missed);
                }
                Err(RecvError::Closed) => {
                    info!("Event bus closed, shuffle-link service stopping");
                    return;
                }
            }
        }
    }

    /// Subscribe to this service's own bus and run on a background task.
    ///
    /// The service keeps the bus open, so the task runs until aborted.
    pub fn spawn(&self) -> JoinHandle<()> {
        let stream = EventStream::new(self.events().subscribe())
            .filter(|event| matches!(event, CoreEvent::Player(_)));
        let service = self.clone();
        tokio::spawn(async move { service.run(stream).await })
    }
}

/// Builder for [`ShuffleLinkService`].
#[derive(Default)]
pub struct ShuffleLinkServiceBuilder {
    library: Option<Arc<dyn MusicLibrary>>,
    queue: Option<Arc<dyn NowPlayingQueue>>,
    player: Option<Arc<dyn PlayerControl>>,
    config: Option<LinkConfig>,
    event_bus: Option<EventBus>,
}

impl ShuffleLinkServiceBuilder {
    pub fn library(mut self, library: Arc<dyn MusicLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn queue(mut self, queue: Arc<dyn NowPlayingQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn player(mut self, player: Arc<dyn PlayerControl>) -> Self {
        self.player = Some(player);
        self
    }

    /// Use one host object for both queue mutation and player control.
    pub fn queue_and_player<T>(self, host: Arc<T>) -> Self
    where
        T: NowPlayingQueue + PlayerControl + 'static,
    {
        self.queue(host.clone()).player(host)
    }

    /// Defaults to [`LinkConfig::default`].
    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing bus instead of creating one sized from the config.
    pub fn event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<ShuffleLinkService> {
        let library = self.library.ok_or_else(|| missing("MusicLibrary"))?;
        let queue = self.queue.ok_or_else(|| missing("NowPlayingQueue"))?;
        let player = self.player.ok_or_else(|| missing("PlayerControl"))?;

        let config = self.config.unwrap_or_default();
        config.validate()?;
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::new(config.event_buffer_size));

        Ok(ShuffleLinkService::assemble(
            LinkDependencies::new(library, queue, player),
            config,
            event_bus,
        ))
    }
}

fn missing(capability: &str) -> RuntimeError {
    RuntimeError::CapabilityMissing {
        capability: capability.to_string(),
        message: "required by the shuffle-link service".to_string(),
    }
}
