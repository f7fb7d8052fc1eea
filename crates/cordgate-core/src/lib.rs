//! cordgate core: transport-agnostic protocol primitives and the error surface.
//!
//! This crate defines the wire envelope, the op-code / close-code / event-name
//! vocabularies and the intents mask shared by the session client and by tools
//! that only need to read or write gateway frames. It carries no transport or
//! runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed server input surfaces as `GatewayError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, GatewayError, Result};
