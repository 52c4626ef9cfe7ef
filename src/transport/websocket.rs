use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{WebSocketStream, accept_async};
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::config::SessionSettings;
use crate::queue::Message;
use crate::session::{Session, SessionRegistry};
use crate::utils::error::Result;

/// Text frame a client sends to receive the registry's diagnostic dump.
pub const DUMP_STATE_COMMAND: &str = "dumpstate";

type WsSink = SplitSink<WebSocketStream<TcpStream>, WsMessage>;

pub async fn start_websocket_server(
    addr: &str,
    registry: Arc<SessionRegistry>,
    settings: SessionSettings,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);
    serve(listener, registry, settings).await
}

/// Accepts connections on `listener` until it fails.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
    settings: SessionSettings,
) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let registry = Arc::clone(&registry);
        let settings = settings.clone();
        tokio::spawn(async move {
            handle_connection(stream, peer, registry, settings).await;
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<SessionRegistry>,
    settings: SessionSettings,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error from {peer}: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let Some(session) = registry.open_session() else {
        let _ = ws_sender.send(WsMessage::Close(None)).await;
        return;
    };
    info!("{peer} connected as {}", session.id);

    let poll_interval = Duration::from_millis(settings.poll_interval_ms);
    let writer = tokio::spawn(drain_session(Arc::clone(&session), ws_sender, poll_interval));

    while let Some(frame) = ws_receiver.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                debug!("read error on {}: {e}", session.id);
                break;
            }
        };

        match frame {
            WsMessage::Text(text) if text.trim() == DUMP_STATE_COMMAND => {
                let mut report = Vec::new();
                match registry.dump_state(&mut report) {
                    Ok(()) => {
                        let report = String::from_utf8_lossy(&report).into_owned();
                        session.enqueue(Message::text(session.next_message_id(), report));
                    }
                    Err(e) => error!("failed to dump state for {}: {e}", session.id),
                }
            }
            WsMessage::Text(text) => {
                let message = Message::text(session.next_message_id(), text.as_str());
                registry.broadcast(&session.id, &message);
            }
            WsMessage::Binary(data) => {
                let message = Message::binary(session.next_message_id(), data.to_vec());
                registry.broadcast(&session.id, &message);
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }

    writer.abort();
    registry.close_session(&session.id);
    info!("{} disconnected", session.id);
}

/// Writes queued messages to the socket, sleeping `poll_interval` whenever
/// the queue is empty. Stops on termination or a failed send.
async fn drain_session(session: Arc<Session>, mut sink: WsSink, poll_interval: Duration) {
    let termination = session.queue().termination().clone();

    while !termination.is_set() {
        let Some(message) = session.queue().dequeue() else {
            tokio::time::sleep(poll_interval).await;
            continue;
        };

        if let Err(e) = sink.send(to_frame(message)).await {
            warn!("failed to send to {}: {e}", session.id);
            break;
        }
    }
    debug!("send loop closed for {}", session.id);
}

fn to_frame(message: Message) -> WsMessage {
    if message.is_binary() {
        return WsMessage::binary(message.into_payload());
    }
    match String::from_utf8(message.into_payload()) {
        Ok(text) => WsMessage::text(text),
        Err(e) => WsMessage::text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
