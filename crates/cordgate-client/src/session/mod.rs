//! Session lifecycle.
//!
//! - `machine`: the sans-IO state machine (handshake, cursor, reconnect decisions).
//! - `driver`: the async loop that owns the transport and executes the machine's actions.
//! - `backoff`: reconnect delay policy.

pub mod backoff;
pub(crate) mod driver;
pub mod machine;

pub use backoff::{BackoffPolicy, ReconnectBackoff};
pub use machine::{Action, SessionMachine, SessionSnapshot, SessionState};
