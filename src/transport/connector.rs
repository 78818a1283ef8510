//! Socket factory seam.
//!
//! [`Connector`] opens one WebSocket to an endpoint. The client only ever
//! sees the boxed [`FrameSocket`] it returns, so the same state machine runs
//! over a real network socket or an in-memory one.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::result::Result as StdResult;

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::debug;
use url::Url;

use crate::error::Result;

// ============================================================================
// Types
// ============================================================================

/// A duplex WebSocket message stream.
pub trait FrameSocket:
    Stream<Item = StdResult<Message, WsError>> + Sink<Message, Error = WsError> + Send + Unpin
{
}

impl<T> FrameSocket for T where
    T: Stream<Item = StdResult<Message, WsError>> + Sink<Message, Error = WsError> + Send + Unpin
{
}

/// Pinned, boxed socket returned by a [`Connector`].
///
/// Build one with `Box::pin(stream)`.
pub type BoxSocket = Pin<Box<dyn FrameSocket>>;

// ============================================================================
// Connector
// ============================================================================

/// Opens WebSocket channels.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a channel to `endpoint`, completing the WebSocket handshake.
    ///
    /// # Errors
    ///
    /// Any error is treated as an open failure and triggers the reconnect
    /// policy.
    async fn connect(&self, endpoint: &Url) -> Result<BoxSocket>;
}

// ============================================================================
// TungsteniteConnector
// ============================================================================

/// Network connector backed by `tokio-tungstenite`.
///
/// `wss://` endpoints need the crate's `rustls` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, endpoint: &Url) -> Result<BoxSocket> {
        let (stream, response) = connect_async(endpoint.as_str()).await?;

        debug!(%endpoint, status = %response.status(), "WebSocket handshake completed");

        Ok(Box::pin(stream))
    }
}
