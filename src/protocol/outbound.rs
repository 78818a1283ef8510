//! Outbound frame types (client → server).
//!
//! # Format
//!
//! ```json
//! { "type": "get_unread_count" }
//! { "type": "mark_read", "notification_id": 12 }
//! { "type": "mark_all_read" }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::identifiers::NotificationId;

// ============================================================================
// OutboundFrame
// ============================================================================

/// A request sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Ask the server to push the current unread count.
    GetUnreadCount,

    /// Mark one notification as read.
    MarkRead {
        /// Notification to mark.
        notification_id: NotificationId,
    },

    /// Mark every notification as read.
    MarkAllRead,
}

impl OutboundFrame {
    /// Creates a `mark_read` frame.
    #[inline]
    #[must_use]
    pub fn mark_read(notification_id: impl Into<NotificationId>) -> Self {
        Self::MarkRead {
            notification_id: notification_id.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
