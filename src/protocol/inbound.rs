//! Inbound frame types (server → client).
//!
//! # Format
//!
//! ```json
//! { "type": "new_notification", "notification": { "id": 12, "type": "outbid", ... } }
//! { "type": "existing_notification", "notification": { ... } }
//! { "type": "unread_count_update", "count": 3 }
//! { "type": "error", "message": "Invalid JSON" }
//! ```
//!
//! Any other `type` decodes to [`InboundFrame::Unknown`] and is ignored.
//! Frames without a `type`, or with a known `type` but missing fields, fail
//! to decode.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, from_str};

use crate::error::Result;
use crate::identifiers::NotificationId;

use super::event::NotificationEvent;

// ============================================================================
// InboundFrame
// ============================================================================

/// One decoded frame received from the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// A notification created while connected.
    NewNotification {
        /// Notification payload.
        notification: Notification,
    },

    /// A notification that existed before this connection.
    ExistingNotification {
        /// Notification payload.
        notification: Notification,
    },

    /// Authoritative unread count.
    UnreadCountUpdate {
        /// Number of unread notifications.
        count: u64,
    },

    /// Logical error reported by the server.
    Error {
        /// Server-provided description.
        message: String,
    },

    /// Unrecognized `type` tag.
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    /// Decodes a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is not a
    /// well-formed frame.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(from_str(text)?)
    }

    /// Converts the frame into the event delivered to listeners.
    ///
    /// Returns `None` for [`InboundFrame::Unknown`].
    #[must_use]
    pub fn into_event(self) -> Option<NotificationEvent> {
        match self {
            Self::NewNotification { notification } => {
                Some(NotificationEvent::NewNotification(notification))
            }
            Self::ExistingNotification { notification } => {
                Some(NotificationEvent::ExistingNotification(notification))
            }
            Self::UnreadCountUpdate { count } => Some(NotificationEvent::UnreadCountUpdate(count)),
            Self::Error { message } => Some(NotificationEvent::Error(message)),
            Self::Unknown => None,
        }
    }
}

// ============================================================================
// Notification
// ============================================================================

/// Notification payload carried by `new_notification` and
/// `existing_notification` frames.
///
/// Every field is optional on the wire; unrecognized fields are kept in
/// [`Notification::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server row id.
    #[serde(default)]
    pub id: Option<NotificationId>,

    /// Notification category.
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationKind>,

    /// Human-readable text.
    #[serde(default)]
    pub message: Option<String>,

    /// Read flag at the time the frame was produced.
    #[serde(default)]
    pub is_read: bool,

    /// ISO-8601 creation time, as sent by the server.
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Fields not covered above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Returns an extra field as `u64`.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }
}

// ============================================================================
// NotificationKind
// ============================================================================

/// Notification category.
///
/// Unknown categories are preserved in [`NotificationKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// Another bidder placed a higher bid.
    Outbid,
    /// A question on the user's auction was answered.
    QuestionAnswered,
    /// A watched auction is about to end.
    AuctionEnding,
    /// The user won an auction.
    AuctionWon,
    /// The user lost an auction.
    AuctionLost,
    /// Category this client does not know about.
    Other(String),
}

impl NotificationKind {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Outbid => "outbid",
            Self::QuestionAnswered => "question_answered",
            Self::AuctionEnding => "auction_ending",
            Self::AuctionWon => "auction_won",
            Self::AuctionLost => "auction_lost",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "outbid" => Self::Outbid,
            "question_answered" => Self::QuestionAnswered,
            "auction_ending" => Self::AuctionEnding,
            "auction_won" => Self::AuctionWon,
            "auction_lost" => Self::AuctionLost,
            _ => Self::Other(name),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
