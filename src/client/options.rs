//! Client configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use notification_client::ClientOptions;
//!
//! let options = ClientOptions::new()
//!     .with_base_delay(Duration::from_millis(500))
//!     .with_max_attempts(8)
//!     .with_backend_port(9001);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::reconnect::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, ReconnectPolicy};
use crate::transport::{DEFAULT_BACKEND_PORT, DEFAULT_DEV_PORT, DEFAULT_NOTIFICATION_PATH};

// ============================================================================
// Constants
// ============================================================================

/// Default upper bound on opening a channel.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ClientOptions
// ============================================================================

/// Endpoint, backoff and timeout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Front-end development port replaced during endpoint derivation.
    pub dev_port: u16,

    /// Backend port substituted for [`ClientOptions::dev_port`].
    pub backend_port: u16,

    /// Notification channel path.
    pub path: String,

    /// Delay before the first automatic retry.
    pub base_delay: Duration,

    /// Automatic retries before giving up.
    pub max_attempts: u32,

    /// Upper bound on opening a channel; expiry counts as an open failure.
    pub connect_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            dev_port: DEFAULT_DEV_PORT,
            backend_port: DEFAULT_BACKEND_PORT,
            path: DEFAULT_NOTIFICATION_PATH.to_string(),
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the development port.
    #[inline]
    #[must_use]
    pub fn with_dev_port(mut self, port: u16) -> Self {
        self.dev_port = port;
        self
    }

    /// Sets the backend port.
    #[inline]
    #[must_use]
    pub fn with_backend_port(mut self, port: u16) -> Self {
        self.backend_port = port;
        self
    }

    /// Sets the notification path.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the delay before the first retry.
    #[inline]
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the number of automatic retries.
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builds the reconnect policy these options describe.
    #[inline]
    #[must_use]
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(self.base_delay, self.max_attempts)
    }
}

// ============================================================================
// Tests
// ============================================================================
