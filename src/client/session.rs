//! One websocket chat session: connect, handshake, keep-alive, receive loop.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{self, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::client::ViewerUpdate;
use crate::client::decoder;
use crate::protocol::{CMD_CHAT, CMD_PING, ConnectRequest, ORIGIN, PONG_FRAME, RawEnvelope, USER_AGENT};

/// Upper bound on one receive wait; a stop request is observed within this
/// interval even when the server is silent.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(1);

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

/// How a session ended, from the supervisor's point of view.
#[derive(Debug)]
pub enum SessionEnd {
    /// The caller raised the stop signal; do not reconnect.
    Stopped,
    /// The connection ended on its own, with the cause when one is known.
    Disconnected(Option<String>),
}

/// Pick one endpoint from the regional pool, uniformly at random. Spreads
/// load and avoids getting stuck on a single unhealthy host across retries.
pub fn pick_endpoint() -> String {
    let n = rand::thread_rng().gen_range(1..=10);
    format!("wss://kr-ss{n}.chat.naver.com/chat")
}

/// Run one chat session against `endpoint` until the connection ends or a
/// stop is requested. Chat events and status notifications go out through
/// `updates`; the return value tells the supervisor whether to reconnect.
pub async fn run(
    endpoint: &str,
    chat_channel_id: &str,
    updates: &mpsc::UnboundedSender<ViewerUpdate>,
    stop: &watch::Receiver<bool>,
) -> SessionEnd {
    status(updates, format!("connecting to {endpoint}"));

    let request = match build_request(endpoint) {
        Ok(request) => request,
        Err(e) => return SessionEnd::Disconnected(Some(e.to_string())),
    };
    if *stop.borrow() {
        return SessionEnd::Stopped;
    }
    // the connect itself is a suspension point; a stop raised while it is
    // pending must not wait for the remote end
    let mut stop_changes = stop.clone();
    let ws = tokio::select! {
        result = connect_async(request) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                return SessionEnd::Disconnected(Some(format!("websocket connect failed: {e}")));
            }
        },
        _ = stop_changes.changed() => return SessionEnd::Stopped,
    };
    let (mut writer, mut reader) = ws.split();

    if let Err(end) = handshake(chat_channel_id, &mut writer, &mut reader).await {
        return end;
    }
    status(updates, format!("connected to chat session {chat_channel_id}"));

    let end = receive_loop(&mut writer, &mut reader, updates, stop).await;

    // Best effort close; the remote end may already be gone.
    let _ = writer.send(Message::Close(None)).await;
    match &end {
        SessionEnd::Stopped => status(updates, "session stopped".to_string()),
        SessionEnd::Disconnected(Some(cause)) => status(updates, format!("disconnected: {cause}")),
        SessionEnd::Disconnected(None) => status(updates, "disconnected by server".to_string()),
    }
    end
}

fn build_request(
    endpoint: &str,
) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, tokio_tungstenite::tungstenite::Error>
{
    let mut request = endpoint.into_client_request()?;
    let headers = request.headers_mut();
    headers.insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    Ok(request)
}

/// Send the connect envelope and discard the single accept frame.
async fn handshake(
    chat_channel_id: &str,
    writer: &mut WsWriter,
    reader: &mut WsReader,
) -> Result<(), SessionEnd> {
    let connect = ConnectRequest::new(chat_channel_id);
    let json = serde_json::to_string(&connect)
        .map_err(|e| SessionEnd::Disconnected(Some(format!("connect encode failed: {e}"))))?;
    writer
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| SessionEnd::Disconnected(Some(format!("connect send failed: {e}"))))?;

    match timeout(HANDSHAKE_TIMEOUT, reader.next()).await {
        Ok(Some(Ok(_accept))) => Ok(()),
        Ok(Some(Err(e))) => Err(SessionEnd::Disconnected(Some(format!(
            "handshake read failed: {e}"
        )))),
        Ok(None) => Err(SessionEnd::Disconnected(Some(
            "connection closed during handshake".to_string(),
        ))),
        Err(_) => Err(SessionEnd::Disconnected(Some(
            "handshake timed out".to_string(),
        ))),
    }
}

/// Steady-state loop: one bounded receive per iteration, stop flag checked
/// every iteration and on every receive timeout.
async fn receive_loop(
    writer: &mut WsWriter,
    reader: &mut WsReader,
    updates: &mpsc::UnboundedSender<ViewerUpdate>,
    stop: &watch::Receiver<bool>,
) -> SessionEnd {
    loop {
        if *stop.borrow() {
            return SessionEnd::Stopped;
        }
        match timeout(RECV_TIMEOUT, reader.next()).await {
            // idle interval; loop around and re-check the stop flag
            Err(_) => continue,
            Ok(None) => return SessionEnd::Disconnected(None),
            Ok(Some(Err(e))) => return SessionEnd::Disconnected(Some(e.to_string())),
            Ok(Some(Ok(Message::Close(_)))) => return SessionEnd::Disconnected(None),
            Ok(Some(Ok(Message::Text(text)))) => {
                if let Err(end) = handle_frame(&text, writer, updates).await {
                    return end;
                }
            }
            // binary and transport-level ping/pong frames are not part of
            // the chat protocol
            Ok(Some(Ok(_))) => {}
        }
    }
}

async fn handle_frame(
    text: &str,
    writer: &mut WsWriter,
    updates: &mpsc::UnboundedSender<ViewerUpdate>,
) -> Result<(), SessionEnd> {
    let envelope = match RawEnvelope::parse(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!("unrecognized frame: {e}");
            status(updates, format!("ignoring unrecognized frame: {e}"));
            return Ok(());
        }
    };

    match envelope.cmd {
        CMD_PING => writer
            .send(Message::Text(PONG_FRAME.into()))
            .await
            .map_err(|e| SessionEnd::Disconnected(Some(format!("pong send failed: {e}")))),
        CMD_CHAT => {
            for item in envelope.chat_items() {
                if let Some(event) = decoder::decode(&item) {
                    // receiver gone means the host is shutting down; the
                    // stop flag will end the loop shortly
                    let _ = updates.send(ViewerUpdate::Chat(event));
                }
            }
            Ok(())
        }
        // unknown commands are not errors; the protocol grows over time
        _ => Ok(()),
    }
}

fn status(updates: &mpsc::UnboundedSender<ViewerUpdate>, message: String) {
    let _ = updates.send(ViewerUpdate::Status(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_endpoint_stays_in_regional_pool() {
        for _ in 0..100 {
            let endpoint = pick_endpoint();
            let n: u32 = endpoint
                .strip_prefix("wss://kr-ss")
                .and_then(|rest| rest.strip_suffix(".chat.naver.com/chat"))
                .and_then(|n| n.parse().ok())
                .unwrap();
            assert!((1..=10).contains(&n), "unexpected endpoint {endpoint}");
        }
    }
}
