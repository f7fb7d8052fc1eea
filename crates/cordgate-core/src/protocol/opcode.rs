use std::fmt;

use serde::{Deserialize, Serialize};

/// Gateway operation code.
///
/// A plain newtype instead of an enum: the server may introduce codes this
/// client does not know, and those must survive decoding untouched. Any JSON
/// integer that fits an `i64` is a representable op code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpCode(pub i64);

impl OpCode {
    /// Receive: an event was dispatched.
    pub const DISPATCH: OpCode = OpCode(0);
    /// Send/Receive: liveness ping.
    pub const HEARTBEAT: OpCode = OpCode(1);
    /// Send: start a new session.
    pub const IDENTIFY: OpCode = OpCode(2);
    /// Send: update the client's presence.
    pub const PRESENCE_UPDATE: OpCode = OpCode(3);
    /// Send: join/leave/move voice channels.
    pub const VOICE_STATE_UPDATE: OpCode = OpCode(4);
    /// Send: resume a disconnected session.
    pub const RESUME: OpCode = OpCode(6);
    /// Receive: reconnect and resume immediately.
    pub const RECONNECT: OpCode = OpCode(7);
    /// Send: request offline guild members.
    pub const REQUEST_GUILD_MEMBERS: OpCode = OpCode(8);
    /// Receive: the session has been invalidated.
    pub const INVALID_SESSION: OpCode = OpCode(9);
    /// Receive: first frame after connecting, carries the heartbeat interval.
    pub const HELLO: OpCode = OpCode(10);
    /// Receive: acknowledgement of a heartbeat.
    pub const HEARTBEAT_ACK: OpCode = OpCode(11);

    /// Name of a known code, `None` for codes outside the vocabulary.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            OpCode::DISPATCH => "DISPATCH",
            OpCode::HEARTBEAT => "HEARTBEAT",
            OpCode::IDENTIFY => "IDENTIFY",
            OpCode::PRESENCE_UPDATE => "PRESENCE_UPDATE",
            OpCode::VOICE_STATE_UPDATE => "VOICE_STATE_UPDATE",
            OpCode::RESUME => "RESUME",
            OpCode::RECONNECT => "RECONNECT",
            OpCode::REQUEST_GUILD_MEMBERS => "REQUEST_GUILD_MEMBERS",
            OpCode::INVALID_SESSION => "INVALID_SESSION",
            OpCode::HELLO => "HELLO",
            OpCode::HEARTBEAT_ACK => "HEARTBEAT_ACK",
            _ => return None,
        };
        Some(name)
    }

    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "UNKNOWN({})", self.0),
        }
    }
}

impl From<i64> for OpCode {
    fn from(v: i64) -> Self {
        OpCode(v)
    }
}
