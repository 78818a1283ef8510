//! Live notification listener.
//!
//! Demonstrates:
//! - Building a client from the page origin
//! - Registering listeners for every event kind
//! - Marking notifications read
//! - Intentional disconnect on Ctrl+C
//!
//! Usage:
//!   cargo run --example listen
//!   cargo run --example listen -- --origin https://auctions.example.com
//!   cargo run --example listen -- --endpoint ws://127.0.0.1:8001/ws/notifications/
//!   cargo run --example listen -- --debug --mark-read

// ============================================================================
// Imports
// ============================================================================

use notification_client::{EventKind, NotificationClient, NotificationEvent, NotificationId, listener};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const DEFAULT_ORIGIN: &str = "http://localhost:5173";

// ============================================================================
// Args
// ============================================================================

/// Command-line arguments.
#[derive(Debug, Clone)]
struct Args {
    origin: String,
    endpoint: Option<String>,
    debug: bool,
    mark_read: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            origin: value_of("--origin").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
            endpoint: value_of("--endpoint"),
            debug: args.iter().any(|a| a == "--debug"),
            mark_read: args.iter().any(|a| a == "--mark-read"),
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "notification_client=debug"
    } else {
        "notification_client=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    println!("=== Notification Listener ===\n");

    let mut builder = NotificationClient::builder().origin(&args.origin);
    if let Some(endpoint) = &args.endpoint {
        builder = builder.endpoint(endpoint);
    }
    let client = builder.build()?;

    println!("[1] Endpoint: {}\n", client.endpoint());

    // ========================================================================
    // Listeners
    // ========================================================================

    // Listeners must not own the client; ids are handed back to main.
    let mark_read = args.mark_read;
    let (read_tx, mut read_rx) = mpsc::unbounded_channel::<NotificationId>();
    let on_notification = listener(move |event| {
        let Some(notification) = event.notification() else {
            return;
        };

        let kind = notification.kind.as_ref().map_or("?", |k| k.as_str());
        let message = notification.message.as_deref().unwrap_or("");
        println!("    [{}] ({kind}) {message}", event.kind());

        if mark_read
            && !notification.is_read
            && let Some(id) = notification.id
        {
            let _ = read_tx.send(id);
        }
    });
    client.on(EventKind::NewNotification, on_notification.clone());
    client.on(EventKind::ExistingNotification, on_notification);

    client.on(
        EventKind::UnreadCountUpdate,
        listener(|event| {
            if let NotificationEvent::UnreadCountUpdate(count) = event {
                println!("    [unread] {count}");
            }
        }),
    );

    client.on(
        EventKind::Error,
        listener(|event| {
            if let NotificationEvent::Error(message) = event {
                eprintln!("    [server error] {message}");
            }
        }),
    );

    client.on(
        EventKind::Connected,
        listener(|event| println!("    ✓ {event:?}")),
    );
    client.on(
        EventKind::Disconnected,
        listener(|event| println!("    ✗ {event:?}")),
    );
    client.on(
        EventKind::GaveUp,
        listener(|event| eprintln!("    ✗ Reconnect abandoned: {event:?}")),
    );

    // ========================================================================
    // Run
    // ========================================================================

    println!("[2] Connecting... (Ctrl+C to exit)\n");
    client.connect();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            Some(id) = read_rx.recv() => {
                if client.mark_notification_read(id) {
                    println!("    → marked {id} read");
                }
            }
        }
    }

    println!("\n[3] Disconnecting...");
    client.disconnect();
    println!("    ✓ Done");

    Ok(())
}
