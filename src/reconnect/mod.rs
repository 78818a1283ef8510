//! Reconnection policy and lifecycle phase.
//!
//! The controller logic itself lives in [`NotificationClient`](crate::NotificationClient),
//! which owns the transport; this module holds the pieces it is built from.

// ============================================================================
// Submodules
// ============================================================================

/// Connection lifecycle phase.
pub mod phase;

/// Exponential backoff schedule.
pub mod policy;

// ============================================================================
// Re-exports
// ============================================================================

pub use phase::ConnectionPhase;
pub use policy::{BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, ReconnectPolicy};
