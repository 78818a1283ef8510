//! Notification protocol message types.
//!
//! Every frame is one JSON object whose `type` field is the discriminator.
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `OutboundFrame` | Client → Server | Resync and read-state requests |
//! | `InboundFrame` | Server → Client | Notifications, counts, errors |
//! | `NotificationEvent` | Client → Listeners | Decoded frames plus lifecycle |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | Listener-facing event types |
//! | `inbound` | Server frames and notification payload |
//! | `outbound` | Client frames |

// ============================================================================
// Submodules
// ============================================================================

/// Listener-facing event types.
pub mod event;

/// Server → client frames.
pub mod inbound;

/// Client → server frames.
pub mod outbound;

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{EventKind, NotificationEvent};
pub use inbound::{InboundFrame, Notification, NotificationKind};
pub use outbound::OutboundFrame;
