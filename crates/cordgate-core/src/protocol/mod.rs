//! Protocol modules.
//!
//! - `envelope`: the JSON wire envelope `{op, d, s?, t?}` and its codec.
//! - `opcode` / `close` / `event`: named vocabularies. Unknown values are
//!   representable everywhere so a server-side extension never breaks decoding.
//! - `intents`: the validated intents bit set sent with Identify.
//! - `activity`: presence activity kinds and the activity flag bit set.

pub mod activity;
pub mod close;
pub mod envelope;
pub mod event;
pub mod intents;
pub mod opcode;

pub use activity::{ActivityFlags, ActivityType};
pub use close::CloseCode;
pub use envelope::{Envelope, Identify, IdentifyProperties, Resume};
pub use intents::Intents;
pub use opcode::OpCode;
