//! In-memory transport shared by session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use cordgate_client::transport::{Transport, TransportEvent, TransportFactory};
use cordgate_core::error::{GatewayError, Result};

/// Test side of one connection.
pub struct MockConn {
    pub url: String,
    events: mpsc::UnboundedSender<TransportEvent>,
    sent: mpsc::UnboundedReceiver<String>,
    closed: Arc<Mutex<Option<(u16, String)>>>,
    fail_sends: Arc<AtomicBool>,
}

impl MockConn {
    pub fn push(&self, frame: Value) {
        self.events.send(TransportEvent::Message(frame.to_string())).unwrap();
    }

    pub fn push_raw(&self, text: &str) {
        self.events.send(TransportEvent::Message(text.to_string())).unwrap();
    }

    pub fn server_close(&self, code: u16) {
        self.events
            .send(TransportEvent::Close {
                code: Some(code),
                reason: "server close".into(),
            })
            .unwrap();
    }

    pub fn push_error(&self, error: &str) {
        self.events.send(TransportEvent::Error(error.to_string())).unwrap();
    }

    /// Every later client send on this connection fails.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Next frame the client sent, heartbeats included.
    pub async fn next_raw(&mut self) -> Value {
        let text = self.sent.recv().await.expect("client transport dropped");
        serde_json::from_str(&text).unwrap()
    }

    /// Next non-heartbeat frame the client sent.
    pub async fn next_frame(&mut self) -> Value {
        loop {
            let v = self.next_raw().await;
            if v["op"] != 1 {
                return v;
            }
        }
    }

    pub fn closed_with(&self) -> Option<u16> {
        self.closed.lock().unwrap().as_ref().map(|(code, _)| *code)
    }
}

struct MockTransport {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: mpsc::UnboundedSender<String>,
    closed: Arc<Mutex<Option<(u16, String)>>>,
    fail_sends: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn next_event(&mut self) -> TransportEvent {
        self.events.recv().await.unwrap_or(TransportEvent::Close {
            code: None,
            reason: "test dropped connection".into(),
        })
    }

    async fn send(&mut self, text: String) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(GatewayError::TransportFailure("broken pipe".into()));
        }
        self.sent
            .send(text)
            .map_err(|_| GatewayError::TransportFailure("test side gone".into()))
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<()> {
        *self.closed.lock().unwrap() = Some((code, reason.to_string()));
        Ok(())
    }
}

/// Hands every opened connection to the test through a channel.
pub struct MockFactory {
    conns: mpsc::UnboundedSender<MockConn>,
    fail_opens: AtomicUsize,
}

impl MockFactory {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockConn>) {
        Self::failing_first(0)
    }

    /// The first `n` opens fail with a transport error.
    pub fn failing_first(n: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<MockConn>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let factory = Arc::new(Self {
            conns: tx,
            fail_opens: AtomicUsize::new(n),
        });
        (factory, rx)
    }
}

#[async_trait]
impl TransportFactory for MockFactory {
    async fn open(&self, url: &str) -> Result<Box<dyn Transport>> {
        if self
            .fail_opens
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(GatewayError::TransportFailure("connection refused".into()));
        }

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(Mutex::new(None));
        let fail_sends = Arc::new(AtomicBool::new(false));
        events_tx.send(TransportEvent::Open).unwrap();

        let _ = self.conns.send(MockConn {
            url: url.to_string(),
            events: events_tx,
            sent: sent_rx,
            closed: closed.clone(),
            fail_sends: fail_sends.clone(),
        });
        Ok(Box::new(MockTransport {
            events: events_rx,
            sent: sent_tx,
            closed,
            fail_sends,
        }))
    }
}

pub fn hello(interval_ms: u64) -> Value {
    json!({"op": 10, "d": {"heartbeat_interval": interval_ms}, "s": null, "t": null})
}

pub fn ready(seq: u64) -> Value {
    json!({
        "op": 0,
        "s": seq,
        "t": "READY",
        "d": {"session_id": "sess-1", "resume_gateway_url": "wss://resume.example"}
    })
}

pub fn dispatch(seq: u64, event: &str, d: Value) -> Value {
    json!({"op": 0, "s": seq, "t": event, "d": d})
}

pub fn ack() -> Value {
    json!({"op": 11})
}
