//! Notification client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`NotificationClient`] | Connection owner, reconnection controller, public API |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientOptions`] | Endpoint, backoff and timeout settings |
//!
//! # Example
//!
//! ```no_run
//! use notification_client::{EventKind, NotificationClient, NotificationEvent, Result, listener};
//!
//! # async fn example() -> Result<()> {
//! let client = NotificationClient::builder()
//!     .origin("http://localhost:5173")
//!     .build()?;
//!
//! client.on(
//!     EventKind::UnreadCountUpdate,
//!     listener(|event| {
//!         if let NotificationEvent::UnreadCountUpdate(count) = event {
//!             println!("{count} unread");
//!         }
//!     }),
//! );
//!
//! client.connect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client core: transport ownership and reconnection control.
pub mod core;

/// Endpoint, backoff and timeout settings.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::NotificationClient;
pub use options::{ClientOptions, DEFAULT_CONNECT_TIMEOUT};
