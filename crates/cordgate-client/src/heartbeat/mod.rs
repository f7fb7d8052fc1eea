//! Heartbeat scheduling.
//!
//! The scheduler is clock-driven but owns no timer task: the session driver
//! sleeps until [`HeartbeatScheduler::deadline`] in the same `select!` loop that
//! processes inbound frames, so firing and acknowledging never race.

pub mod scheduler;

pub use scheduler::{Beat, HeartbeatScheduler};
