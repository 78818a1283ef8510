//! Notification client: transport ownership and reconnection control.
//!
//! # State
//!
//! All mutable connection state lives in one [`ConnectionState`] behind a
//! mutex. The lock is never held across an `.await` or while listeners run.
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `channel` | Live channel, if open |
//! | `phase` | Lifecycle phase; gates `connect()` |
//! | `policy` | Retry counter and backoff schedule |
//! | `retries` | Retries scheduled since the last open or `disconnect()`; reported by `GaveUp` |
//! | `generation` | Bumped by `disconnect()`; stale opens and timers compare against it |
//! | `retry_timer` | Armed reconnect timer |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::SinkExt;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::to_string;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::dispatch::{Dispatcher, Listener};
use crate::error::Error;
use crate::identifiers::{ConnectionId, NotificationId};
use crate::protocol::{EventKind, NotificationEvent, OutboundFrame};
use crate::reconnect::{ConnectionPhase, ReconnectPolicy};
use crate::transport::{BoxSocket, CLIENT_DISCONNECT_REASON, Connection, Connector, NORMAL_CLOSURE};

use super::builder::ClientBuilder;
use super::options::ClientOptions;

// ============================================================================
// ConnectionState
// ============================================================================

/// Mutable connection state.
struct ConnectionState {
    channel: Option<Connection>,
    phase: ConnectionPhase,
    policy: ReconnectPolicy,
    retries: u32,
    generation: u64,
    retry_timer: Option<JoinHandle<()>>,
}

// ============================================================================
// NotificationClient
// ============================================================================

/// Real-time notification client.
///
/// Owns one WebSocket channel at a time, reconnects with exponential backoff
/// after abnormal closures, and fans decoded events out to listeners.
///
/// Cloning is cheap and every clone drives the same connection. Construct
/// one at startup with [`NotificationClient::builder()`] and call
/// [`disconnect`](Self::disconnect) at shutdown.
///
/// # Delivery
///
/// Outbound frames are at-most-once: they are written only if a channel is
/// open at the time of the call, never queued, never retried.
#[derive(Clone)]
pub struct NotificationClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for NotificationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("NotificationClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("phase", &state.phase)
            .field("reconnect_attempts", &state.policy.attempts())
            .field("unread_count", &self.inner.dispatcher.unread_count())
            .finish()
    }
}

struct ClientInner {
    endpoint: Url,
    connect_timeout: Duration,
    connector: Arc<dyn Connector>,
    runtime: Handle,
    dispatcher: Arc<Dispatcher>,
    state: Mutex<ConnectionState>,
}

impl NotificationClient {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn new(
        endpoint: Url,
        options: ClientOptions,
        connector: Arc<dyn Connector>,
        runtime: Handle,
    ) -> Self {
        let state = ConnectionState {
            channel: None,
            phase: ConnectionPhase::Idle,
            policy: options.reconnect_policy(),
            retries: 0,
            generation: 0,
            retry_timer: None,
        };

        Self {
            inner: Arc::new(ClientInner {
                endpoint,
                connect_timeout: options.connect_timeout,
                connector,
                runtime,
                dispatcher: Arc::new(Dispatcher::new()),
                state: Mutex::new(state),
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts opening the channel.
    ///
    /// No-op while a channel is open or an open is in flight. Never blocks
    /// and never fails: open errors are logged and handed to the reconnect
    /// policy.
    pub fn connect(&self) {
        self.inner.connect();
    }

    /// Closes the channel intentionally and stops automatic reconnection.
    ///
    /// Sends close code 1000, cancels any armed retry timer, and pins the
    /// retry counter at its ceiling. A later [`connect`](Self::connect)
    /// opens a new channel; the counter resets only once that open succeeds.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    // ========================================================================
    // Outbound
    // ========================================================================

    /// Serializes and sends an arbitrary message.
    ///
    /// Returns `true` if the frame was handed to an open channel. When
    /// disconnected the message is dropped silently.
    pub fn send_message<T: Serialize + ?Sized>(&self, message: &T) -> bool {
        match to_string(message) {
            Ok(text) => self.inner.send_text(text),
            Err(e) => {
                warn!(error = %e, "Failed to serialize outbound message");
                false
            }
        }
    }

    /// Asks the server to mark one notification as read.
    ///
    /// The unread count changes only when the server answers with an
    /// `unread_count_update`.
    pub fn mark_notification_read(&self, id: impl Into<NotificationId>) -> bool {
        self.send_message(&OutboundFrame::mark_read(id))
    }

    /// Asks the server to mark every notification as read.
    pub fn mark_all_notifications_read(&self) -> bool {
        self.send_message(&OutboundFrame::MarkAllRead)
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Registers a listener for `kind`.
    ///
    /// Listeners run in registration order on the task that received the
    /// frame. Registering the same handle twice invokes it twice.
    pub fn on(&self, kind: EventKind, listener: Listener) {
        self.inner.dispatcher.on(kind, listener);
    }

    /// Removes one registration of `listener` for `kind`.
    ///
    /// Returns `true` if a registration was removed.
    pub fn off(&self, kind: EventKind, listener: &Listener) -> bool {
        self.inner.dispatcher.off(kind, listener)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns `true` while a channel is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().channel.is_some()
    }

    /// Returns the last unread count pushed by the server.
    #[inline]
    #[must_use]
    pub fn unread_count(&self) -> u64 {
        self.inner.dispatcher.unread_count()
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.inner.state.lock().phase
    }

    /// Returns the number of retries scheduled since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.state.lock().policy.attempts()
    }

    /// Returns the notification endpoint.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }
}

// ============================================================================
// ClientInner - Controller
// ============================================================================

impl ClientInner {
    /// Transitions Idle/ReconnectPending → Connecting.
    fn connect(self: &Arc<Self>) {
        let generation = {
            let mut state = self.state.lock();
            if !state.phase.accepts_connect() {
                debug!(phase = %state.phase, "Connect ignored, channel open or opening");
                return;
            }

            if let Some(timer) = state.retry_timer.take() {
                timer.abort();
            }
            state.phase = ConnectionPhase::Connecting;
            state.generation
        };

        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.open(generation).await;
        });
    }

    /// Opens a channel and installs it, or reports the failure.
    async fn open(self: Arc<Self>, generation: u64) {
        debug!(endpoint = %self.endpoint, "Opening notification channel");

        let result = match timeout(self.connect_timeout, self.connector.connect(&self.endpoint)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::connection_timeout(
                self.connect_timeout.as_millis() as u64,
            )),
        };

        match result {
            Ok(socket) => self.on_open(generation, socket),
            Err(e) if e.is_recoverable() => {
                warn!(endpoint = %self.endpoint, error = %e, "Failed to open notification channel");
                self.on_open_failed(generation);
            }
            Err(e) => {
                // Custom connectors may fail this way; retried all the same.
                error!(endpoint = %self.endpoint, error = %e, "Notification channel open failed with non-connection error");
                self.on_open_failed(generation);
            }
        }
    }

    /// Transitions Connecting → Open.
    fn on_open(self: &Arc<Self>, generation: u64, socket: BoxSocket) {
        let id = ConnectionId::generate();
        let mut state = self.state.lock();

        if state.generation != generation {
            drop(state);
            debug!("Channel opened after disconnect, discarding");
            self.runtime.spawn(close_socket(socket));
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let connection = Connection::spawn(
            id,
            socket,
            Arc::clone(&self.dispatcher),
            move |id, code| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_closed(id, code);
                }
            },
            &self.runtime,
        );

        match to_string(&OutboundFrame::GetUnreadCount) {
            Ok(text) => {
                connection.send(text);
            }
            Err(e) => warn!(error = %e, "Failed to encode unread count request"),
        }

        state.channel = Some(connection);
        state.phase = ConnectionPhase::Open;
        state.policy.reset();
        state.retries = 0;
        drop(state);

        info!(connection_id = %id, endpoint = %self.endpoint, "Notification channel open");
    }

    /// An open attempt failed; treated as an abnormal closure.
    fn on_open_failed(self: &Arc<Self>, generation: u64) {
        let gave_up = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            self.schedule_reconnect(&mut state)
        };

        if let Some(event) = gave_up {
            self.dispatcher.emit(&event);
        }
    }

    /// The event loop of channel `id` stopped with `code`.
    fn on_closed(self: &Arc<Self>, id: ConnectionId, code: u16) {
        let gave_up = {
            let mut state = self.state.lock();
            let is_current = state.channel.as_ref().is_some_and(|c| c.id() == id);
            if !is_current {
                trace!(connection_id = %id, code, "Ignoring close of replaced channel");
                return;
            }

            state.channel = None;
            info!(connection_id = %id, code, "Notification channel closed");

            if code == NORMAL_CLOSURE {
                state.phase = ConnectionPhase::Idle;
                None
            } else {
                self.schedule_reconnect(&mut state)
            }
        };

        self.dispatcher
            .emit(&NotificationEvent::Disconnected { code });
        if let Some(event) = gave_up {
            self.dispatcher.emit(&event);
        }
    }

    /// Transitions to ReconnectPending, or to Idle when the ceiling is hit.
    ///
    /// Returns the give-up event to emit once the lock is released.
    fn schedule_reconnect(
        self: &Arc<Self>,
        state: &mut ConnectionState,
    ) -> Option<NotificationEvent> {
        let Some((attempt, delay)) = state.policy.next_attempt() else {
            let attempts = state.retries;
            state.phase = ConnectionPhase::Idle;
            warn!(attempts, counter = state.policy.attempts(), "Reconnect attempts exhausted, giving up");
            return Some(NotificationEvent::GaveUp { attempts });
        };
        state.retries += 1;

        info!(
            attempt,
            max_attempts = state.policy.max_attempts(),
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );

        let generation = state.generation;
        let weak = Arc::downgrade(self);
        state.phase = ConnectionPhase::ReconnectPending;
        state.retry_timer = Some(self.runtime.spawn(async move {
            sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_retry_timer(generation);
            }
        }));

        None
    }

    /// Retry timer fired.
    fn on_retry_timer(self: &Arc<Self>, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.generation != generation || state.phase != ConnectionPhase::ReconnectPending {
                debug!(phase = %state.phase, "Stale reconnect timer, declining");
                return;
            }
            state.retry_timer = None;
        }

        self.connect();
    }

    /// Transitions any phase → Idle and pins the retry counter.
    fn disconnect(&self) {
        let channel = {
            let mut state = self.state.lock();
            state.generation = state.generation.wrapping_add(1);
            if let Some(timer) = state.retry_timer.take() {
                timer.abort();
            }
            state.phase = ConnectionPhase::Idle;
            state.policy.exhaust();
            state.retries = 0;
            state.channel.take()
        };

        let Some(channel) = channel else {
            debug!("Disconnect with no open channel");
            return;
        };

        channel.close(NORMAL_CLOSURE, CLIENT_DISCONNECT_REASON);
        info!(connection_id = %channel.id(), "Notification channel closed by client");
        self.dispatcher.emit(&NotificationEvent::Disconnected {
            code: NORMAL_CLOSURE,
        });
    }

    /// Hands a serialized frame to the open channel, if any.
    fn send_text(&self, text: String) -> bool {
        let state = self.state.lock();
        match state.channel.as_ref() {
            Some(channel) => channel.send(text),
            None => {
                trace!("Not connected, dropping outbound frame");
                false
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Closes a socket that was opened after the session it belonged to ended.
async fn close_socket(mut socket: BoxSocket) {
    let frame = CloseFrame {
        code: CloseCode::from(NORMAL_CLOSURE),
        reason: CLIENT_DISCONNECT_REASON.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to close discarded socket");
    }
}

// ============================================================================
// Tests
// ============================================================================
