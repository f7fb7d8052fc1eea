//! Transport seam.
//!
//! The session core only needs a message-oriented socket that reports
//! open/message/close/error and accepts text frames. Any implementation of
//! [`TransportFactory`] + [`Transport`] can be plugged in; [`ws::WsTransportFactory`]
//! is the default websocket one.

pub mod ws;

use async_trait::async_trait;

use cordgate_core::error::Result;

pub use ws::{WsTransport, WsTransportFactory};

/// Event reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection is usable. Reported once, before any message.
    Open,
    /// One inbound text frame.
    Message(String),
    /// The peer closed (or the stream ended, `code == None`).
    Close { code: Option<u16>, reason: String },
    /// Socket-level error. The transport is unusable afterwards.
    Error(String),
}

/// One live connection.
#[async_trait]
pub trait Transport: Send {
    /// Next event. Must be cancel-safe: the session polls it inside `select!`
    /// and drops the future whenever a timer fires first.
    async fn next_event(&mut self) -> TransportEvent;

    async fn send(&mut self, text: String) -> Result<()>;

    async fn close(&mut self, code: u16, reason: &str) -> Result<()>;
}

/// Opens connections. Called once per connection attempt.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn Transport>>;
}
