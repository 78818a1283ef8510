//! Connection lifecycle phase.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionPhase
// ============================================================================

/// Where the client is in its connect / reconnect cycle.
///
/// ```text
/// Idle ──connect()──► Connecting ──open──► Open ──close 1000 / disconnect()──► Idle
///  ▲                      │                  │
///  │                  open failed       abnormal close
///  │                      ▼                  ▼
///  └──── ceiling ──── ReconnectPending ◄─────┘
///                         │ timer
///                         ▼
///                     Connecting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    /// No channel and nothing scheduled.
    #[default]
    Idle,
    /// A channel is being opened.
    Connecting,
    /// A channel is open.
    Open,
    /// A retry timer is armed.
    ReconnectPending,
}

impl ConnectionPhase {
    /// Returns `true` if `connect()` would start a new attempt.
    #[inline]
    #[must_use]
    pub const fn accepts_connect(&self) -> bool {
        matches!(self, Self::Idle | Self::ReconnectPending)
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::ReconnectPending => "reconnect_pending",
        };
        f.write_str(name)
    }
}
