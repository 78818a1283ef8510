//! Notification client - self-healing real-time notifications over WebSocket.
//!
//! This library keeps one persistent WebSocket open to a notification
//! server, reconnects with exponential backoff when the channel drops,
//! decodes the server's tagged JSON frames and fans them out to listeners.
//!
//! # Architecture
//!
//! ```text
//! connect() ──► Connector ──► Connection (event loop) ──► Dispatcher ──► listeners
//!                   ▲                  │
//!                   │           abnormal close
//!                   └── retry timer ◄──┘   (base × 2^(n-1), up to the ceiling)
//! ```
//!
//! Key design points:
//!
//! - At most one live channel; `connect()` is a no-op while open or opening
//! - On open, the client immediately asks for the unread count
//! - Close code 1000 is intentional; anything else triggers the retry policy
//! - `disconnect()` pins the retry counter and cancels pending timers
//! - Outbound frames are at-most-once and never queued while disconnected
//!
//! # Quick Start
//!
//! ```no_run
//! use notification_client::{EventKind, NotificationClient, NotificationEvent, listener};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NotificationClient::builder()
//!         .origin("http://localhost:5173")
//!         .build()?;
//!
//!     client.on(
//!         EventKind::NewNotification,
//!         listener(|event| {
//!             if let Some(notification) = event.notification() {
//!                 println!("{:?}", notification.message);
//!             }
//!         }),
//!     );
//!     client.on(
//!         EventKind::GaveUp,
//!         listener(|event| eprintln!("notifications offline: {event:?}")),
//!     );
//!
//!     client.connect();
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`NotificationClient`], builder and options |
//! | [`dispatch`] | Listener registry and frame dispatcher |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Frame and event types |
//! | [`reconnect`] | Backoff policy and lifecycle phase |
//! | [`transport`] | WebSocket channel, connector and endpoint derivation |

// ============================================================================
// Modules
// ============================================================================

/// Client entry point.
///
/// Use [`NotificationClient::builder()`] to create a configured client.
pub mod client;

/// Listener registry and frame dispatcher.
pub mod dispatch;

/// Error types and result aliases.
///
/// Only construction is fallible; see [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Notification protocol message types.
pub mod protocol;

/// Reconnection policy and lifecycle phase.
pub mod reconnect;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{ClientBuilder, ClientOptions, NotificationClient};

// Dispatch types
pub use dispatch::{Listener, listener};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ConnectionId, NotificationId};

// Protocol types
pub use protocol::{EventKind, Notification, NotificationEvent, NotificationKind, OutboundFrame};

// Reconnect types
pub use reconnect::{ConnectionPhase, ReconnectPolicy};

// Transport types
pub use transport::{Connector, TungsteniteConnector};
