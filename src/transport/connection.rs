//! WebSocket channel and event loop.
//!
//! # Event Loop
//!
//! Each open channel spawns one tokio task that handles:
//!
//! - The `Connected` event, emitted before any frame is read
//! - Incoming text frames, handed to the [`Dispatcher`] in receive order
//! - Outgoing frames queued by [`Connection::send`]
//! - Intentional close requested by [`Connection::close`]
//!
//! When the loop ends it reports the close code through the `on_closed`
//! callback supplied at spawn time. Nothing is buffered across channels:
//! frames queued on a closed channel are dropped.
//!
//! Once [`Connection::close`] returns, no further inbound frame reaches the
//! dispatcher, even if it was already buffered in the socket.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, trace, warn};

use crate::dispatch::Dispatcher;
use crate::identifiers::ConnectionId;
use crate::protocol::NotificationEvent;

use super::connector::BoxSocket;

// ============================================================================
// Constants
// ============================================================================

/// Intentional, normal closure. Suppresses reconnection.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close frame carried no status code.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Channel ended without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Reason sent with an intentional close.
pub const CLIENT_DISCONNECT_REASON: &str = "Client disconnect";

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Transmit a serialized frame.
    Send(String),
    /// Send a close frame and stop.
    Close { code: u16, reason: String },
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to one open WebSocket channel.
///
/// Dropping every handle closes the channel with [`NORMAL_CLOSURE`].
pub struct Connection {
    /// Identity of this channel.
    id: ConnectionId,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Set by `close()`; the event loop stops dispatching once it is set.
    closed: Arc<AtomicBool>,
}

impl Connection {
    /// Spawns the event loop for an open socket.
    ///
    /// `on_closed` runs exactly once, on the event loop task, with the
    /// channel id and close code.
    pub(crate) fn spawn<F>(
        id: ConnectionId,
        socket: BoxSocket,
        dispatcher: Arc<Dispatcher>,
        on_closed: F,
        runtime: &Handle,
    ) -> Self
    where
        F: FnOnce(ConnectionId, u16) + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let loop_closed = Arc::clone(&closed);
        runtime.spawn(async move {
            let code =
                Self::run_event_loop(id, socket, command_rx, &dispatcher, &loop_closed).await;
            on_closed(id, code);
        });

        Self {
            id,
            command_tx,
            closed,
        }
    }

    /// Returns the channel identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a serialized frame for transmission.
    ///
    /// Returns `false` if the event loop has already stopped. Delivery is
    /// at-most-once: a write failure is logged and not retried.
    pub fn send(&self, text: String) -> bool {
        self.command_tx.send(ConnectionCommand::Send(text)).is_ok()
    }

    /// Requests an orderly close with the given code and reason.
    ///
    /// Inbound dispatch stops immediately; the close frame is sent by the
    /// event loop.
    pub fn close(&self, code: u16, reason: impl Into<String>) {
        self.closed.store(true, Ordering::Release);
        let _ = self.command_tx.send(ConnectionCommand::Close {
            code,
            reason: reason.into(),
        });
    }

    /// Event loop that handles WebSocket I/O. Returns the close code.
    async fn run_event_loop(
        id: ConnectionId,
        socket: BoxSocket,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        dispatcher: &Dispatcher,
        closed: &AtomicBool,
    ) -> u16 {
        let (mut ws_write, mut ws_read) = socket.split();

        // Announced here so it precedes every frame from this channel.
        dispatcher.emit(&NotificationEvent::Connected { connection_id: id });

        let code = loop {
            tokio::select! {
                biased;

                // Commands from the client
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(text)) => {
                            Self::write_frame(id, &mut ws_write, text).await;
                        }

                        Some(ConnectionCommand::Close { code, reason }) => {
                            debug!(connection_id = %id, code, "Closing channel");
                            let frame = CloseFrame {
                                code: CloseCode::from(code),
                                reason: reason.into(),
                            };
                            let _ = ws_write.send(Message::Close(Some(frame))).await;
                            break code;
                        }

                        None => {
                            debug!(connection_id = %id, "All handles dropped, closing channel");
                            let _ = ws_write.close().await;
                            break NORMAL_CLOSURE;
                        }
                    }
                }

                // Incoming frames from server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            if closed.load(Ordering::Acquire) {
                                trace!(connection_id = %id, "Dropping frame received after close");
                                continue;
                            }
                            trace!(connection_id = %id, len = text.len(), "Frame received");
                            dispatcher.dispatch_text(&text);
                        }

                        Some(Ok(Message::Close(frame))) => {
                            let code = frame
                                .as_ref()
                                .map_or(NO_STATUS_RECEIVED, |f| u16::from(f.code));
                            debug!(connection_id = %id, code, "WebSocket closed by remote");
                            let _ = ws_write.close().await;
                            break code;
                        }

                        Some(Ok(Message::Binary(data))) => {
                            warn!(connection_id = %id, len = data.len(), "Ignoring binary frame");
                        }

                        Some(Err(e)) => {
                            warn!(connection_id = %id, error = %e, "WebSocket error");
                            break ABNORMAL_CLOSURE;
                        }

                        None => {
                            debug!(connection_id = %id, "WebSocket stream ended");
                            break ABNORMAL_CLOSURE;
                        }

                        // Ignore Ping, Pong, raw Frame
                        _ => {}
                    }
                }
            }
        };

        debug!(connection_id = %id, code, "Event loop terminated");
        code
    }

    /// Writes one text frame.
    async fn write_frame(
        id: ConnectionId,
        ws_write: &mut SplitSink<BoxSocket, Message>,
        text: String,
    ) {
        if let Err(e) = ws_write.send(Message::Text(text.into())).await {
            warn!(connection_id = %id, error = %e, "Failed to send frame");
            return;
        }

        trace!(connection_id = %id, "Frame sent");
    }
}

// ============================================================================
// Tests
// ============================================================================
