//! Dispatch module exports.
//!
//! Re-exports the handler registry so downstream consumers can depend on this
//! module directly.

pub mod registry;

pub use registry::{Deregistration, Handler, HandlerRegistry, HandlerResult, Selector};
