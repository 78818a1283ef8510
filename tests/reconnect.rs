//! Reconnection controller behavior against an in-memory server.
//!
//! All tests run on a paused clock, so backoff delays are exact and
//! instantaneous.

mod common;

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use notification_client::{ConnectionPhase, EventKind, NotificationClient, NotificationEvent};

use common::{BASE_DELAY, EventLog, MockConnector, Plan, assert_elapsed, client, next_text, push};

// ============================================================================
// Scenario
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_connect_count_drop_reconnect_scenario() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept, Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    let (_, connected) = events.next().await;
    assert!(matches!(connected, NotificationEvent::Connected { .. }));
    assert!(client.is_connected());
    assert_eq!(client.phase(), ConnectionPhase::Open);

    let mut server = servers.recv().await.expect("first server");
    assert_eq!(next_text(&mut server).await, r#"{"type":"get_unread_count"}"#);

    push(&mut server, r#"{"type":"unread_count_update","count":3}"#).await;
    let (_, update) = events.next().await;
    assert_eq!(update, NotificationEvent::UnreadCountUpdate(3));
    assert_eq!(client.unread_count(), 3);

    drop(server);
    let (closed_at, disconnected) = events.next().await;
    assert_eq!(disconnected, NotificationEvent::Disconnected { code: 1006 });
    assert!(!client.is_connected());
    assert_eq!(client.phase(), ConnectionPhase::ReconnectPending);
    assert_eq!(client.reconnect_attempts(), 1);

    let (_, reconnected) = events.next().await;
    assert!(matches!(reconnected, NotificationEvent::Connected { .. }));
    assert_elapsed(closed_at, connector.attempts()[1], BASE_DELAY);
    assert_eq!(client.reconnect_attempts(), 0);
    assert!(client.is_connected());

    let mut server = servers.recv().await.expect("second server");
    assert_eq!(next_text(&mut server).await, r#"{"type":"get_unread_count"}"#);
}

// ============================================================================
// Backoff
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_and_stops_at_ceiling() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    drop(servers.recv().await.expect("server"));

    let (closed_at, _) = events.next_of(EventKind::Disconnected).await;
    let (_, gave_up) = events.next_of(EventKind::GaveUp).await;
    assert_eq!(gave_up, NotificationEvent::GaveUp { attempts: 5 });

    let attempts = connector.attempts();
    assert_eq!(attempts.len(), 6, "initial open plus five retries");

    let mut previous = closed_at;
    for (n, at) in attempts[1..].iter().enumerate() {
        let expected = BASE_DELAY * 2u32.pow(n as u32);
        assert_elapsed(previous, *at, expected);
        previous = *at;
    }

    sleep(Duration::from_secs(600)).await;
    assert_eq!(connector.attempt_count(), 6, "no sixth retry");
    assert_eq!(client.phase(), ConnectionPhase::Idle);
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_initial_open_failure_is_retried() {
    let (connector, _servers) = MockConnector::new(&[Plan::Refuse, Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;

    let attempts = connector.attempts();
    assert_eq!(attempts.len(), 2);
    assert_elapsed(attempts[0], attempts[1], BASE_DELAY);
    assert_eq!(client.reconnect_attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_successful_open_resets_counter_after_failures() {
    let (connector, mut servers) = MockConnector::new(
        &[Plan::Accept, Plan::Refuse, Plan::Refuse, Plan::Accept],
        Plan::Refuse,
    );
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    drop(servers.recv().await.expect("server"));
    events.next_of(EventKind::Disconnected).await;

    events.next_of(EventKind::Connected).await;
    assert_eq!(connector.attempt_count(), 4);
    assert_eq!(client.reconnect_attempts(), 0);

    // A fresh drop starts again from the base delay.
    drop(servers.recv().await.expect("server"));
    let (closed_at, _) = events.next_of(EventKind::Disconnected).await;
    assert_eq!(client.reconnect_attempts(), 1);
    sleep(BASE_DELAY * 2).await;
    assert_elapsed(closed_at, connector.attempts()[4], BASE_DELAY);
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout_counts_as_failure() {
    let (connector, _servers) = MockConnector::new(&[Plan::Hang, Plan::Accept], Plan::Refuse);
    let client = NotificationClient::builder()
        .origin("http://localhost:5173")
        .base_delay(BASE_DELAY)
        .connect_timeout(Duration::from_secs(5))
        .connector(connector.clone())
        .build()
        .expect("build");
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;

    let attempts = connector.attempts();
    assert_elapsed(attempts[0], attempts[1], Duration::from_secs(5) + BASE_DELAY);
}

// ============================================================================
// Close codes
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_remote_normal_closure_does_not_reconnect() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    let mut server = servers.recv().await.expect("server");

    server
        .close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))
        .await
        .expect("server close");

    let (_, event) = events.next_of(EventKind::Disconnected).await;
    assert_eq!(event, NotificationEvent::Disconnected { code: 1000 });
    assert_eq!(client.phase(), ConnectionPhase::Idle);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(connector.attempt_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_remote_error_closure_reconnects() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept, Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    let mut server = servers.recv().await.expect("server");

    server
        .close(Some(CloseFrame {
            code: CloseCode::Error,
            reason: "restarting".into(),
        }))
        .await
        .expect("server close");

    let (_, event) = events.next_of(EventKind::Disconnected).await;
    assert_eq!(event, NotificationEvent::Disconnected { code: 1011 });

    events.next_of(EventKind::Connected).await;
    assert_eq!(connector.attempt_count(), 2);
}

// ============================================================================
// Intentional close
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_disconnect_sends_normal_closure() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    let mut server = servers.recv().await.expect("server");
    assert_eq!(next_text(&mut server).await, r#"{"type":"get_unread_count"}"#);

    client.disconnect();

    let (_, event) = events.next().await;
    assert_eq!(event, NotificationEvent::Disconnected { code: 1000 });
    assert!(!client.is_connected());
    assert_eq!(client.reconnect_attempts(), 5);

    match server.next().await.expect("frame").expect("ok") {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Normal);
            assert_eq!(frame.reason.as_str(), "Client disconnect");
        }
        other => panic!("expected close frame, got {other:?}"),
    }

    sleep(Duration::from_secs(60)).await;
    assert_eq!(connector.attempt_count(), 1);
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_frames_delivered_after_disconnect() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    let mut server = servers.recv().await.expect("server");
    assert_eq!(next_text(&mut server).await, r#"{"type":"get_unread_count"}"#);

    for count in 1..=5 {
        push(
            &mut server,
            &format!(r#"{{"type":"unread_count_update","count":{count}}}"#),
        )
        .await;
    }
    client.disconnect();
    let count_at_disconnect = client.unread_count();

    sleep(Duration::from_secs(1)).await;

    let drained = events.drain();
    let position = drained
        .iter()
        .position(|e| *e == NotificationEvent::Disconnected { code: 1000 })
        .expect("disconnected event");
    assert_eq!(position, drained.len() - 1, "events after disconnect: {drained:?}");
    assert_eq!(client.unread_count(), count_at_disconnect);
    assert!(!client.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_open_failure_after_disconnect_reports_no_retries() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    let _server = servers.recv().await.expect("server");
    client.disconnect();
    events.next_of(EventKind::Disconnected).await;

    client.connect();
    let (_, gave_up) = events.next_of(EventKind::GaveUp).await;
    assert_eq!(gave_up, NotificationEvent::GaveUp { attempts: 0 });
    assert_eq!(connector.attempt_count(), 2);
    assert_eq!(client.phase(), ConnectionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_late_timer_after_disconnect_does_not_reopen() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    drop(servers.recv().await.expect("server"));
    events.next_of(EventKind::Disconnected).await;
    assert_eq!(client.phase(), ConnectionPhase::ReconnectPending);

    client.disconnect();

    sleep(BASE_DELAY * 10).await;
    assert_eq!(connector.attempt_count(), 1);
    assert_eq!(client.phase(), ConnectionPhase::Idle);
    assert!(!client.is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_while_opening_discards_channel() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    client.disconnect();

    let mut server = servers.recv().await.expect("server");
    match server.next().await.expect("frame").expect("ok") {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Normal),
        other => panic!("expected close frame, got {other:?}"),
    }

    sleep(Duration::from_secs(60)).await;
    assert!(!client.is_connected());
    assert_eq!(connector.attempt_count(), 1);
    assert!(events.drain().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_connect_after_disconnect_starts_fresh_session() {
    let (connector, mut servers) = MockConnector::new(&[Plan::Accept, Plan::Accept], Plan::Refuse);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    events.next_of(EventKind::Connected).await;
    client.disconnect();
    events.next_of(EventKind::Disconnected).await;
    drop(servers.recv().await.expect("server"));

    client.connect();
    events.next_of(EventKind::Connected).await;
    assert_eq!(client.reconnect_attempts(), 0);
    assert_eq!(connector.attempt_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_connect_is_noop_while_open_or_opening() {
    let (connector, _servers) = MockConnector::new(&[Plan::Accept], Plan::Accept);
    let client = client(connector.clone());
    let mut events = EventLog::attach(&client);

    client.connect();
    client.connect();
    events.next_of(EventKind::Connected).await;
    client.connect();

    sleep(Duration::from_secs(1)).await;
    assert_eq!(connector.attempt_count(), 1);
    assert!(events.drain().is_empty());
}
