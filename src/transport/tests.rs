use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tungstenite::protocol::Message as WsMessage;

use super::serve;
use crate::config::Settings;
use crate::queue::TerminationFlag;
use crate::session::SessionRegistry;

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn setup_server(max_sessions: usize) -> (String, Arc<SessionRegistry>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = format!("ws://{}", listener.local_addr().expect("local_addr"));
    let registry = Arc::new(SessionRegistry::new(max_sessions, TerminationFlag::new()));

    let mut settings = Settings::default().session;
    settings.poll_interval_ms = 5;
    tokio::spawn(serve(listener, Arc::clone(&registry), settings));

    (addr, registry)
}

async fn connect(addr: &str) -> Client {
    let (ws, _) = connect_async(addr).await.expect("connect");
    ws
}

async fn wait_for_sessions(registry: &SessionRegistry, count: usize) {
    for _ in 0..100 {
        if registry.len() == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} sessions, found {}", registry.len());
}

async fn next_text(ws: &mut Client) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream closed")
        .expect("read error");
    match frame {
        WsMessage::Text(text) => text.as_str().to_owned(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_text_frames_are_relayed_to_other_sessions() {
    let (addr, registry) = setup_server(8).await;
    let mut a = connect(&addr).await;
    let mut b = connect(&addr).await;
    wait_for_sessions(&registry, 2).await;

    a.send(WsMessage::text("status: hello")).await.unwrap();
    assert_eq!(next_text(&mut b).await, "status: hello");
}

#[tokio::test]
async fn test_binary_frames_are_relayed() {
    let (addr, registry) = setup_server(8).await;
    let mut a = connect(&addr).await;
    let mut b = connect(&addr).await;
    wait_for_sessions(&registry, 2).await;

    b.send(WsMessage::binary(vec![7u8, 8, 9])).await.unwrap();
    let frame = tokio::time::timeout(Duration::from_secs(2), a.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(frame.is_binary());
    assert_eq!(&frame.into_data()[..], &[7u8, 8, 9]);
}

#[tokio::test]
async fn test_dumpstate_answers_requesting_session() {
    let (addr, registry) = setup_server(8).await;
    let mut a = connect(&addr).await;
    wait_for_sessions(&registry, 1).await;

    a.send(WsMessage::text("dumpstate")).await.unwrap();
    let report = next_text(&mut a).await;
    assert!(report.starts_with("sessions: 1\n"));
    assert!(report.contains("queue items:"));
}

#[tokio::test]
async fn test_disconnect_closes_session() {
    let (addr, registry) = setup_server(8).await;
    let mut a = connect(&addr).await;
    wait_for_sessions(&registry, 1).await;

    a.close(None).await.unwrap();
    wait_for_sessions(&registry, 0).await;
}

#[tokio::test]
async fn test_connection_over_limit_is_closed() {
    let (addr, registry) = setup_server(1).await;
    let _a = connect(&addr).await;
    wait_for_sessions(&registry, 1).await;

    let mut b = connect(&addr).await;
    let frame = tokio::time::timeout(Duration::from_secs(2), b.next()).await.unwrap();
    assert!(matches!(frame, Some(Ok(WsMessage::Close(_))) | None | Some(Err(_))));
    assert_eq!(registry.len(), 1);
}
