//! Listener registry keyed by [`EventKind`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::protocol::{EventKind, NotificationEvent};

// ============================================================================
// Types
// ============================================================================

/// Listener callback handle.
///
/// Handles are compared by pointer identity: unregister with a clone of the
/// same `Arc` that was registered.
pub type Listener = Arc<dyn Fn(&NotificationEvent) + Send + Sync>;

/// Wraps a closure into a [`Listener`] handle.
#[inline]
#[must_use]
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&NotificationEvent) + Send + Sync + 'static,
{
    Arc::new(callback)
}

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Ordered listener lists per event kind.
///
/// Insertion order is invocation order. The same handle may be registered
/// more than once and is then invoked once per registration.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: FxHashMap<EventKind, Vec<Listener>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener for `kind`.
    pub fn add(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    /// Removes the first registration of `listener` for `kind`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn remove(&mut self, kind: EventKind, listener: &Listener) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };

        match list.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the listeners for `kind`, in invocation order.
    #[must_use]
    pub fn snapshot(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    /// Returns the number of registrations for `kind`.
    #[inline]
    #[must_use]
    pub fn len(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Returns `true` if no listener is registered for any kind.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.values().all(Vec::is_empty)
    }
}

// ============================================================================
// Tests
// ============================================================================
