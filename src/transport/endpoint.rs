//! Notification endpoint derivation.
//!
//! The endpoint is derived from the origin the application is served from:
//!
//! | Origin | Endpoint |
//! |--------|----------|
//! | `http://localhost:5173` | `ws://localhost:8001/ws/notifications/` |
//! | `https://bids.example.com` | `wss://bids.example.com/ws/notifications/` |
//! | `http://10.0.0.5:9000` | `ws://10.0.0.5:9000/ws/notifications/` |
//!
//! Only the development port is rewritten; any other port is kept.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Port the development front-end server listens on.
pub const DEFAULT_DEV_PORT: u16 = 5173;

/// Port the notification backend listens on.
pub const DEFAULT_BACKEND_PORT: u16 = 8001;

/// Fixed notification channel path.
pub const DEFAULT_NOTIFICATION_PATH: &str = "/ws/notifications/";

// ============================================================================
// Functions
// ============================================================================

/// Derives the WebSocket endpoint from a page origin.
///
/// # Errors
///
/// - [`Error::Config`] if the origin has no host or is not `http(s)`
/// - [`Error::Url`] if the derived URL does not parse
pub fn derive_endpoint(origin: &Url, dev_port: u16, backend_port: u16, path: &str) -> Result<Url> {
    let scheme = match origin.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(Error::config(format!(
                "Origin scheme must be http or https, got: {other}"
            )));
        }
    };

    let host = origin
        .host_str()
        .ok_or_else(|| Error::config(format!("Origin has no host: {origin}")))?;

    let port = match origin.port() {
        Some(port) if port == dev_port => Some(backend_port),
        other => other,
    };

    let mut endpoint = Url::parse(&format!("{scheme}://{host}"))?;
    endpoint
        .set_port(port)
        .map_err(|()| Error::config(format!("Cannot set port on endpoint for {origin}")))?;
    endpoint.set_path(path);

    Ok(endpoint)
}

/// Validates an explicitly configured endpoint.
///
/// # Errors
///
/// Returns [`Error::Config`] unless the scheme is `ws` or `wss`.
pub fn validate_endpoint(endpoint: Url) -> Result<Url> {
    match endpoint.scheme() {
        "ws" | "wss" => Ok(endpoint),
        other => Err(Error::config(format!(
            "Endpoint scheme must be ws or wss, got: {other}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
