//! Shuffle session walkthrough
//!
//! Plays a short shuffled session over an in-memory library where a two-part
//! recording is linked through its comment tags, and prints every action the
//! engine takes.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example shuffle_demo
//!
//! # JSON logs
//! cargo run -p core-service --example shuffle_demo -- json
//! ```

use bridge_traits::LogLevel;
use core_library::{InMemoryLibrary, Track};
use core_playback::InMemoryQueue;
use core_runtime::events::{CoreEvent, LinkEvent, PlayerEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::ShuffleLinkService;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )?;

    let library = InMemoryLibrary::with_tracks([
        Track::new("/music/Atom Heart Mother/01.flac")
            .with_title("Atom Heart Mother")
            .with_artist("Pink Floyd")
            .with_album("Atom Heart Mother")
            .with_comment("Next: title=If;artist=Pink Floyd"),
        Track::new("/music/Atom Heart Mother/02.flac")
            .with_title("If")
            .with_artist("Pink Floyd")
            .with_album("Atom Heart Mother")
            .with_comment("Previous: title=Atom Heart Mother;artist=Pink Floyd"),
        Track::new("/music/Abbey Road/16.flac")
            .with_title("Golden Slumbers")
            .with_artist("The Beatles")
            .with_comment("Next: title=Carry That Weight"),
        Track::new("/music/Abbey Road/17.flac")
            .with_title("Carry That Weight")
            .with_artist("The Beatles")
            .with_comment("Previous: title=Golden Slumbers\nNext: title=The End"),
        Track::new("/music/Abbey Road/18.flac")
            .with_title("The End")
            .with_artist("The Beatles")
            .with_comment("Previous: title=Carry That Weight"),
        Track::new("/music/Misc/blue.flac").with_title("Blue"),
    ])?;

    let queue = Arc::new(
        InMemoryQueue::with_tracks([
            "/music/Misc/blue.flac",
            "/music/Abbey Road/17.flac",
            "/music/Atom Heart Mother/02.flac",
        ])
        .with_shuffle(true),
    );

    let service = ShuffleLinkService::builder()
        .library(Arc::new(library))
        .queue_and_player(queue.clone())
        .build()?;
    let mut link_events = service.events().subscribe();

    info!("=== Shuffle Link Demo ===");
    print_queue("initial", &queue);

    // Shuffle lands in the middle of the medley
    let track = queue.play_at(1)?;
    service
        .handle_event(&PlayerEvent::TrackChanged { track })
        .await?;
    service.handle_event(&PlayerEvent::QueueChanged).await?;
    print_queue("after medley", &queue);

    // Listener jumps elsewhere; the medley is pulled back out
    let last = queue.len() - 1;
    let track = queue.play_at(last)?;
    service
        .handle_event(&PlayerEvent::TrackChanged { track })
        .await?;
    service.handle_event(&PlayerEvent::QueueChanged).await?;
    print_queue("after jump", &queue);

    // A hand edit pauses linking until the window passes
    queue.push("/music/Misc/blue.flac");
    service.handle_event(&PlayerEvent::QueueChanged).await?;
    tokio::time::sleep(service.config().debounce_window + Duration::from_millis(50)).await;

    while let Ok(event) = link_events.try_recv() {
        if let CoreEvent::Link(event) = event {
            describe(&event);
        }
    }

    info!("=== Demo Complete ===");
    Ok(())
}

fn print_queue(label: &str, queue: &InMemoryQueue) {
    let entries: Vec<String> = queue.entries().iter().map(|t| t.to_string()).collect();
    let current = queue.current_track().map(|t| t.to_string());
    info!(?entries, ?current, "Queue {}", label);
}

fn describe(event: &LinkEvent) {
    match event {
        LinkEvent::ChainSpliced {
            tracks,
            splice_anchor_index,
            ..
        } => println!(
            "spliced {} tracks after position {}",
            tracks.len(),
            splice_anchor_index
        ),
        LinkEvent::ChainRetracted { tracks, removed } => {
            println!("retracted {} of {} chain entries", removed, tracks.len())
        }
        LinkEvent::SuppressionStarted => println!("linking paused"),
        LinkEvent::SuppressionEnded => println!("linking resumed"),
        LinkEvent::ReconcileFailed { message } => println!("failed: {}", message),
    }
}
