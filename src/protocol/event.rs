//! Events delivered to application listeners.
//!
//! Four kinds come from inbound frames; three are lifecycle notifications
//! raised by the client itself.
//!
//! | Kind | Source | Payload |
//! |------|--------|---------|
//! | [`EventKind::NewNotification`] | `new_notification` frame | [`Notification`] |
//! | [`EventKind::ExistingNotification`] | `existing_notification` frame | [`Notification`] |
//! | [`EventKind::UnreadCountUpdate`] | `unread_count_update` frame | count |
//! | [`EventKind::Error`] | `error` frame | server message |
//! | [`EventKind::Connected`] | channel opened | [`ConnectionId`] |
//! | [`EventKind::Disconnected`] | channel closed | close code |
//! | [`EventKind::GaveUp`] | reconnect ceiling reached | retries made |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::identifiers::ConnectionId;

use super::inbound::Notification;

// ============================================================================
// EventKind
// ============================================================================

/// Listener registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// `new_notification` frames.
    NewNotification,
    /// `existing_notification` frames.
    ExistingNotification,
    /// `unread_count_update` frames.
    UnreadCountUpdate,
    /// `error` frames.
    Error,
    /// A channel finished opening.
    Connected,
    /// The live channel closed.
    Disconnected,
    /// Automatic reconnection stopped at the attempt ceiling.
    GaveUp,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 7] = [
        Self::NewNotification,
        Self::ExistingNotification,
        Self::UnreadCountUpdate,
        Self::Error,
        Self::Connected,
        Self::Disconnected,
        Self::GaveUp,
    ];

    /// Returns the snake_case name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NewNotification => "new_notification",
            Self::ExistingNotification => "existing_notification",
            Self::UnreadCountUpdate => "unread_count_update",
            Self::Error => "error",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::GaveUp => "gave_up",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// NotificationEvent
// ============================================================================

/// An event passed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// Notification created while connected.
    NewNotification(Notification),

    /// Notification that existed before this connection.
    ExistingNotification(Notification),

    /// New authoritative unread count.
    UnreadCountUpdate(u64),

    /// Server-reported logical error.
    Error(String),

    /// A channel opened.
    Connected {
        /// Identity of the new channel.
        connection_id: ConnectionId,
    },

    /// The live channel closed.
    Disconnected {
        /// WebSocket close code (1000 for a normal closure).
        code: u16,
    },

    /// No further automatic reconnects will be made.
    GaveUp {
        /// Retries scheduled since the last successful open or `disconnect()`.
        ///
        /// Zero when an open started after `disconnect()` fails: the retry
        /// budget stays spent until a channel opens again.
        attempts: u32,
    },
}

impl NotificationEvent {
    /// Returns the registry key for this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::NewNotification(_) => EventKind::NewNotification,
            Self::ExistingNotification(_) => EventKind::ExistingNotification,
            Self::UnreadCountUpdate(_) => EventKind::UnreadCountUpdate,
            Self::Error(_) => EventKind::Error,
            Self::Connected { .. } => EventKind::Connected,
            Self::Disconnected { .. } => EventKind::Disconnected,
            Self::GaveUp { .. } => EventKind::GaveUp,
        }
    }

    /// Returns the notification payload, if this event carries one.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            Self::NewNotification(n) | Self::ExistingNotification(n) => Some(n),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
