//! Gateway close codes.
//!
//! Anything outside the fresh-session set is treated as reconnectable: the
//! client keeps its resume cursor and attempts a Resume on the next connection.

use std::fmt;

/// Websocket close code as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseCode(pub u16);

impl CloseCode {
    /// Normal closure. Sent by the client on shutdown and when discarding a session.
    pub const NORMAL: CloseCode = CloseCode(1000);

    pub const UNKNOWN_ERROR: CloseCode = CloseCode(4000);
    pub const UNKNOWN_OPCODE: CloseCode = CloseCode(4001);
    pub const DECODE_ERROR: CloseCode = CloseCode(4002);
    pub const NOT_AUTHENTICATED: CloseCode = CloseCode(4003);
    pub const AUTHENTICATION_FAILED: CloseCode = CloseCode(4004);
    pub const ALREADY_AUTHENTICATED: CloseCode = CloseCode(4005);
    pub const INVALID_SEQ: CloseCode = CloseCode(4007);
    pub const RATE_LIMITED: CloseCode = CloseCode(4008);
    pub const SESSION_TIMED_OUT: CloseCode = CloseCode(4009);
    pub const INVALID_SHARD: CloseCode = CloseCode(4010);
    pub const SHARDING_REQUIRED: CloseCode = CloseCode(4011);
    pub const INVALID_API_VERSION: CloseCode = CloseCode(4012);
    pub const INVALID_INTENT: CloseCode = CloseCode(4013);
    pub const DISALLOWED_INTENT: CloseCode = CloseCode(4014);

    /// Codes after which the stored session cannot be resumed and the next
    /// handshake must Identify from scratch.
    pub const FRESH_SESSION: [CloseCode; 6] = [
        CloseCode::AUTHENTICATION_FAILED,
        CloseCode::ALREADY_AUTHENTICATED,
        CloseCode::INVALID_SEQ,
        CloseCode::INVALID_SHARD,
        CloseCode::INVALID_INTENT,
        CloseCode::DISALLOWED_INTENT,
    ];

    pub fn requires_fresh_session(self) -> bool {
        CloseCode::FRESH_SESSION.contains(&self)
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            CloseCode::NORMAL => "NORMAL",
            CloseCode::UNKNOWN_ERROR => "UNKNOWN_ERROR",
            CloseCode::UNKNOWN_OPCODE => "UNKNOWN_OPCODE",
            CloseCode::DECODE_ERROR => "DECODE_ERROR",
            CloseCode::NOT_AUTHENTICATED => "NOT_AUTHENTICATED",
            CloseCode::AUTHENTICATION_FAILED => "AUTHENTICATION_FAILED",
            CloseCode::ALREADY_AUTHENTICATED => "ALREADY_AUTHENTICATED",
            CloseCode::INVALID_SEQ => "INVALID_SEQ",
            CloseCode::RATE_LIMITED => "RATE_LIMITED",
            CloseCode::SESSION_TIMED_OUT => "SESSION_TIMED_OUT",
            CloseCode::INVALID_SHARD => "INVALID_SHARD",
            CloseCode::SHARDING_REQUIRED => "SHARDING_REQUIRED",
            CloseCode::INVALID_API_VERSION => "INVALID_API_VERSION",
            CloseCode::INVALID_INTENT => "INVALID_INTENT",
            CloseCode::DISALLOWED_INTENT => "DISALLOWED_INTENT",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
