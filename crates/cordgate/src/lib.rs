//! Top-level facade crate for cordgate.
//!
//! Re-exports the protocol primitives and the session client so users can depend on a single crate.

pub mod core {
    pub use cordgate_core::*;
}

pub mod client {
    pub use cordgate_client::*;
}
