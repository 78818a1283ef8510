//! WebSocket transport layer.
//!
//! This module owns the single channel between the client and the
//! notification server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                          ┌─────────────────┐
//! │  NotificationClient  │                          │  Notification   │
//! │                      │        WebSocket         │  server         │
//! │  Connector           │◄────────────────────────►│                 │
//! │  → Connection        │   ws(s)://host:8001      │  /ws/           │
//! │    (event loop)      │   /ws/notifications/     │  notifications/ │
//! └──────────────────────┘                          └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `derive_endpoint` - Build the endpoint from the page origin
//! 2. `Connector::connect` - Open the socket and complete the handshake
//! 3. `Connection::spawn` - Start the event loop
//! 4. `Connection::send` - Queue outbound frames
//! 5. `Connection::close` - Intentional close with code 1000
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Channel handle and event loop |
//! | `connector` | Socket factory seam |
//! | `endpoint` | Endpoint derivation |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket channel and event loop.
pub mod connection;

/// Socket factory seam.
pub mod connector;

/// Endpoint derivation from the page origin.
pub mod endpoint;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{
    ABNORMAL_CLOSURE, CLIENT_DISCONNECT_REASON, Connection, NO_STATUS_RECEIVED, NORMAL_CLOSURE,
};
pub use connector::{BoxSocket, Connector, FrameSocket, TungsteniteConnector};
pub use endpoint::{
    DEFAULT_BACKEND_PORT, DEFAULT_DEV_PORT, DEFAULT_NOTIFICATION_PATH, derive_endpoint,
    validate_endpoint,
};
