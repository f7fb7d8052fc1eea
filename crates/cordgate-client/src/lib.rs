//! cordgate client: a long-lived session over an event-stream gateway.
//!
//! Wires the handshake state machine, heartbeat scheduler, reconnect backoff
//! and handler registry around a pluggable transport. Consumers register
//! handlers per op code or per dispatch event name and get events in arrival
//! order across reconnects and resumes.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod config;
pub mod dispatch;
pub mod heartbeat;
pub mod session;
pub mod transport;

pub use client::GatewayClient;
pub use config::ClientConfig;
pub use dispatch::{Deregistration, HandlerRegistry, HandlerResult, Selector};
pub use session::{SessionSnapshot, SessionState};
