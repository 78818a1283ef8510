//! Event dispatch.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `dispatcher` | Frame decoding, unread count, listener fan-out |
//! | `registry` | Ordered listener lists per [`EventKind`](crate::EventKind) |

// ============================================================================
// Submodules
// ============================================================================

/// Frame decoding and listener fan-out.
pub mod dispatcher;

/// Listener registry.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use dispatcher::Dispatcher;
pub use registry::{Listener, ListenerRegistry, listener};
