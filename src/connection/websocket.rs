//! WebSocket transport built on tokio-tungstenite

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::CloseFrame, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info};
use url::Url;

use super::transport::{Connection, Transport, TransportEvent};
use crate::error::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects with `ws://` or `wss://`; other schemes are unsupported
#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Transport for WsTransport {
    fn check_support(&self, url: &Url) -> Result<()> {
        match url.scheme() {
            "ws" | "wss" => Ok(()),
            other => Err(Error::transport_unsupported(
                url.as_str(),
                format!("scheme '{}' is not ws or wss", other),
            )),
        }
    }

    async fn connect(&mut self, url: &Url) -> Result<Box<dyn Connection>> {
        info!(url = %url, "Connecting");

        match tokio::time::timeout(self.connect_timeout, connect_async(url.as_str())).await {
            Ok(Ok((stream, response))) => {
                debug!(status = %response.status(), "WebSocket handshake complete");
                Ok(Box::new(WsConnection::new(stream)))
            }
            Ok(Err(e)) => Err(Error::connection_failed(url.as_str(), e.to_string())),
            Err(_) => Err(Error::ConnectionTimeout {
                url: url.to_string(),
                timeout_ms: self.connect_timeout.as_millis() as u64,
            }),
        }
    }
}

/// An open WebSocket
pub struct WsConnection {
    stream: WsStream,
    /// Close reason owed to the caller after an error was reported
    pending_close: Option<String>,
}

impl WsConnection {
    fn new(stream: WsStream) -> Self {
        Self {
            stream,
            pending_close: None,
        }
    }

    fn fail(&mut self, message: String) -> TransportEvent {
        error!(error = %message, "WebSocket error");
        self.pending_close = Some(message.clone());
        TransportEvent::Error(message)
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn next_event(&mut self) -> TransportEvent {
        if let Some(reason) = self.pending_close.take() {
            return TransportEvent::Closed(reason);
        }

        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return TransportEvent::Message(text.into_bytes()),
                Some(Ok(WsMessage::Binary(data))) => return TransportEvent::Message(data),
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Err(e) = self.stream.send(WsMessage::Pong(data)).await {
                        return self.fail(e.to_string());
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    info!(frame = ?frame, "Received close frame");
                    return TransportEvent::Closed(close_reason(frame));
                }
                Some(Ok(_)) => {
                    // Pong and raw frames
                }
                Some(Err(e)) => return self.fail(e.to_string()),
                None => {
                    info!("WebSocket stream ended");
                    return TransportEvent::Closed("stream ended".to_string());
                }
            }
        }
    }
}

fn close_reason(frame: Option<CloseFrame<'_>>) -> String {
    match frame {
        Some(frame) if frame.reason.is_empty() => format!("code {}", u16::from(frame.code)),
        Some(frame) => format!("code {}: {}", u16::from(frame.code), frame.reason),
        None => "closed by peer".to_string(),
    }
}
