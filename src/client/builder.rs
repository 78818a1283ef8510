//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use notification_client::NotificationClient;
//!
//! # async fn example() -> notification_client::Result<()> {
//! let client = NotificationClient::builder()
//!     .origin("http://localhost:5173")
//!     .build()?;
//!
//! client.connect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{Connector, TungsteniteConnector, derive_endpoint, validate_endpoint};

use super::core::NotificationClient;
use super::options::ClientOptions;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`NotificationClient`].
///
/// Use [`NotificationClient::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ClientBuilder {
    /// Page origin the endpoint is derived from.
    origin: Option<String>,
    /// Explicit endpoint, bypassing derivation.
    endpoint: Option<String>,
    /// Endpoint, backoff and timeout settings.
    options: ClientOptions,
    /// Socket factory.
    connector: Option<Arc<dyn Connector>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("origin", &self.origin)
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .field("custom_connector", &self.connector.is_some())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin the application is served from.
    ///
    /// # Arguments
    ///
    /// * `origin` - e.g. `"http://localhost:5173"` or `"https://bids.example.com"`
    #[inline]
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the endpoint directly instead of deriving it from the origin.
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Replaces all options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the delay before the first retry.
    #[inline]
    #[must_use]
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.options.base_delay = delay;
        self
    }

    /// Sets the number of automatic retries.
    #[inline]
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.options.max_attempts = attempts;
        self
    }

    /// Sets the connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Sets a custom socket factory.
    ///
    /// Defaults to [`TungsteniteConnector`].
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Builds the client with validation.
    ///
    /// Must be called from within a tokio runtime; the client spawns its
    /// event loop and retry timers on that runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if neither origin nor endpoint is set, or options are invalid
    /// - [`Error::Url`] if the origin or endpoint does not parse
    /// - [`Error::NoRuntime`] if called outside a tokio runtime
    pub fn build(self) -> Result<NotificationClient> {
        self.validate_options()?;
        let endpoint = self.resolve_endpoint()?;
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TungsteniteConnector));

        Ok(NotificationClient::new(
            endpoint,
            self.options,
            connector,
            runtime,
        ))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates backoff and timeout settings.
    fn validate_options(&self) -> Result<()> {
        if self.options.max_attempts == 0 {
            return Err(Error::config(
                "max_attempts must be at least 1. Use .max_attempts() to set it.",
            ));
        }

        if self.options.base_delay.is_zero() {
            return Err(Error::config(
                "base_delay must be greater than zero. Use .base_delay() to set it.",
            ));
        }

        if self.options.connect_timeout.is_zero() {
            return Err(Error::config(
                "connect_timeout must be greater than zero. Use .connect_timeout() to set it.",
            ));
        }

        if !self.options.path.starts_with('/') {
            return Err(Error::config(format!(
                "Notification path must start with '/', got: {}",
                self.options.path
            )));
        }

        Ok(())
    }

    /// Resolves the endpoint from the explicit setting or the origin.
    fn resolve_endpoint(&self) -> Result<Url> {
        if let Some(endpoint) = &self.endpoint {
            return validate_endpoint(Url::parse(endpoint)?);
        }

        let origin = self.origin.as_deref().ok_or_else(|| {
            Error::config(
                "Origin is required. Use .origin() or .endpoint() to set it.\n\
                 Example: NotificationClient::builder().origin(\"http://localhost:5173\")",
            )
        })?;

        derive_endpoint(
            &Url::parse(origin)?,
            self.options.dev_port,
            self.options.backend_port,
            &self.options.path,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
