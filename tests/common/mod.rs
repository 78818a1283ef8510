//! Shared fixtures for integration tests.
//!
//! - `MockConnector` opens in-memory WebSockets and hands the server half to
//!   the test
//! - `EventLog` records every event with the (virtual) time it was emitted

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::io::{DuplexStream, duplex};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async, client_async};
use url::Url;

use notification_client::transport::BoxSocket;
use notification_client::{
    Connector, Error, EventKind, NotificationClient, NotificationEvent, Result, listener,
};

// ============================================================================
// Constants
// ============================================================================

/// Backoff base used by the fixtures.
pub const BASE_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for waiting on a single event (virtual time).
const EVENT_TIMEOUT: Duration = Duration::from_secs(600);

// ============================================================================
// MockServer
// ============================================================================

/// Server half of an in-memory WebSocket.
pub type MockServer = WebSocketStream<DuplexStream>;

/// Sends one text frame from the server.
pub async fn push(server: &mut MockServer, text: &str) {
    server
        .send(Message::Text(text.into()))
        .await
        .expect("server send");
}

/// Receives the next text frame at the server.
pub async fn next_text(server: &mut MockServer) -> String {
    loop {
        let message = timeout(EVENT_TIMEOUT, server.next())
            .await
            .expect("timed out waiting for client frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return text.to_string();
        }
    }
}

// ============================================================================
// MockConnector
// ============================================================================

/// What the next `connect` call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Complete the handshake.
    Accept,
    /// Fail immediately.
    Refuse,
    /// Never complete.
    Hang,
}

/// Connector backed by `tokio::io::duplex`.
#[derive(Clone)]
pub struct MockConnector {
    shared: Arc<Shared>,
}

struct Shared {
    plans: Mutex<VecDeque<Plan>>,
    fallback: Plan,
    attempts: Mutex<Vec<Instant>>,
    servers: mpsc::UnboundedSender<MockServer>,
}

impl MockConnector {
    /// Creates a connector following `plans`, then `fallback` forever.
    pub fn new(plans: &[Plan], fallback: Plan) -> (Self, mpsc::UnboundedReceiver<MockServer>) {
        let (servers, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            plans: Mutex::new(plans.iter().copied().collect()),
            fallback,
            attempts: Mutex::new(Vec::new()),
            servers,
        });
        (Self { shared }, rx)
    }

    /// Times at which `connect` was called.
    pub fn attempts(&self) -> Vec<Instant> {
        self.shared.attempts.lock().clone()
    }

    /// Number of `connect` calls so far.
    pub fn attempt_count(&self) -> usize {
        self.shared.attempts.lock().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, endpoint: &Url) -> Result<BoxSocket> {
        self.shared.attempts.lock().push(Instant::now());
        let plan = self
            .shared
            .plans
            .lock()
            .pop_front()
            .unwrap_or(self.shared.fallback);

        match plan {
            Plan::Refuse => Err(Error::connection("connection refused")),
            Plan::Hang => {
                std::future::pending::<()>().await;
                Err(Error::ConnectionClosed)
            }
            Plan::Accept => {
                let (client_io, server_io) = duplex(64 * 1024);
                let server = tokio::spawn(accept_async(server_io));
                let (client, _) = client_async(endpoint.as_str(), client_io).await?;
                let server = server
                    .await
                    .map_err(|e| Error::connection(e.to_string()))??;
                let _ = self.shared.servers.send(server);
                Ok(Box::pin(client))
            }
        }
    }
}

// ============================================================================
// EventLog
// ============================================================================

/// Records every event emitted by a client.
pub struct EventLog {
    rx: mpsc::UnboundedReceiver<(Instant, NotificationEvent)>,
}

impl EventLog {
    /// Subscribes to every event kind.
    pub fn attach(client: &NotificationClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        for kind in EventKind::ALL {
            let tx = tx.clone();
            client.on(
                kind,
                listener(move |event| {
                    let _ = tx.send((Instant::now(), event.clone()));
                }),
            );
        }
        Self { rx }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> (Instant, NotificationEvent) {
        timeout(EVENT_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Waits for the next event of `kind`, skipping others.
    pub async fn next_of(&mut self, kind: EventKind) -> (Instant, NotificationEvent) {
        loop {
            let (at, event) = self.next().await;
            if event.kind() == kind {
                return (at, event);
            }
        }
    }

    /// Returns events already emitted without waiting.
    pub fn drain(&mut self) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        while let Ok((_, event)) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds a client over `connector` with the fixture backoff.
pub fn client(connector: MockConnector) -> NotificationClient {
    NotificationClient::builder()
        .origin("http://localhost:5173")
        .base_delay(BASE_DELAY)
        .connector(connector)
        .build()
        .expect("build client")
}

/// Asserts `later - earlier` is `expected`, within timer granularity.
pub fn assert_elapsed(earlier: Instant, later: Instant, expected: Duration) {
    let elapsed = later.duration_since(earlier);
    assert!(
        elapsed >= expected && elapsed <= expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}
