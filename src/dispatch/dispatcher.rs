//! Frame decoding and listener fan-out.
//!
//! The dispatcher owns the listener registry and the mirrored unread count.
//! Listeners run synchronously on the task that received the frame, in
//! registration order. A panicking listener is logged and skipped; the
//! remaining listeners still run.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::protocol::{EventKind, InboundFrame, NotificationEvent};

use super::registry::{Listener, ListenerRegistry};

// ============================================================================
// Dispatcher
// ============================================================================

/// Decodes inbound frames and notifies listeners.
#[derive(Default)]
pub struct Dispatcher {
    /// Registered listeners.
    registry: Mutex<ListenerRegistry>,
    /// Last count pushed by the server.
    unread_count: AtomicU64,
}

impl Dispatcher {
    /// Creates a dispatcher with no listeners and an unread count of zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `kind`.
    pub fn on(&self, kind: EventKind, listener: Listener) {
        self.registry.lock().add(kind, listener);
    }

    /// Unregisters the first registration of `listener` for `kind`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn off(&self, kind: EventKind, listener: &Listener) -> bool {
        self.registry.lock().remove(kind, listener)
    }

    /// Returns the number of listeners registered for `kind`.
    #[inline]
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry.lock().len(kind)
    }

    /// Returns the last unread count received from the server.
    #[inline]
    #[must_use]
    pub fn unread_count(&self) -> u64 {
        self.unread_count.load(Ordering::Acquire)
    }

    /// Decodes a text frame and dispatches it.
    ///
    /// Malformed frames are logged and dropped. Returns `true` if the frame
    /// decoded.
    pub fn dispatch_text(&self, text: &str) -> bool {
        match InboundFrame::decode(text) {
            Ok(frame) => {
                self.dispatch_frame(frame);
                true
            }
            Err(e) => {
                warn!(error = %e, text = %text, "Failed to parse incoming frame");
                false
            }
        }
    }

    /// Dispatches a decoded frame.
    pub fn dispatch_frame(&self, frame: InboundFrame) {
        match frame {
            InboundFrame::UnreadCountUpdate { count } => {
                self.unread_count.store(count, Ordering::Release);
                debug!(count, "Unread count updated");
            }
            InboundFrame::Error { ref message } => {
                error!(message = %message, "Server reported error");
            }
            InboundFrame::Unknown => {
                trace!("Ignoring frame with unknown type");
                return;
            }
            _ => {}
        }

        if let Some(event) = frame.into_event() {
            self.emit(&event);
        }
    }

    /// Invokes every listener registered for the event's kind.
    ///
    /// Returns the number of listeners that completed without panicking.
    pub fn emit(&self, event: &NotificationEvent) -> usize {
        let kind = event.kind();
        // Lock released before invoking so listeners may call on/off.
        let listeners = self.registry.lock().snapshot(kind);

        let mut completed = 0;
        for listener in &listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => completed += 1,
                Err(_) => error!(kind = %kind, "Listener panicked"),
            }
        }

        trace!(kind = %kind, listeners = listeners.len(), "Event emitted");
        completed
    }
}

// ============================================================================
// Tests
// ============================================================================
