//! Websocket transport over tokio-tungstenite.
//!
//! - Text frames are delivered as-is; binary frames are accepted when they are UTF-8.
//! - Ping/Pong are answered by tungstenite itself and never reach the session.
//! - The first event of every connection is `Open`.

use std::borrow::Cow;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use cordgate_core::error::{GatewayError, Result};

use super::{Transport, TransportEvent, TransportFactory};

/// Opens [`WsTransport`] connections.
#[derive(Debug, Clone, Default)]
pub struct WsTransportFactory;

impl WsTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for WsTransportFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn Transport>> {
        let (stream, response) = connect_async(url)
            .await
            .map_err(|e| GatewayError::TransportFailure(format!("connect failed: {e}")))?;
        tracing::info!(status = %response.status(), "gateway connected");
        Ok(Box::new(WsTransport::new(stream)))
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    opened: bool,
    closed: bool,
}

impl WsTransport {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            opened: false,
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn next_event(&mut self) -> TransportEvent {
        if !self.opened {
            self.opened = true;
            return TransportEvent::Open;
        }
        loop {
            let Some(incoming) = self.stream.next().await else {
                return TransportEvent::Close {
                    code: None,
                    reason: "stream ended".into(),
                };
            };
            let msg = match incoming {
                Ok(msg) => msg,
                Err(e) => return TransportEvent::Error(e.to_string()),
            };
            match msg {
                Message::Text(text) => return TransportEvent::Message(text),
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => return TransportEvent::Message(text),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping non-utf8 binary frame");
                    }
                },
                Message::Close(frame) => {
                    let (code, reason) = match frame {
                        Some(f) => (Some(u16::from(f.code)), f.reason.into_owned()),
                        None => (None, String::new()),
                    };
                    return TransportEvent::Close { code, reason };
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| GatewayError::TransportFailure(format!("send failed: {e}")))
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let frame = CloseFrame {
            code: WsCloseCode::from(code),
            reason: Cow::Owned(reason.to_owned()),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(|e| GatewayError::TransportFailure(format!("close failed: {e}")))
    }
}
