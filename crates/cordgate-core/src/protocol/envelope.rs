//! Wire envelope (JSON) and its codec.
//!
//! On the wire: `{ "op": int, "d": any, "s": int?, "t": string? }`.
//! Internally the envelope keeps `s`/`t` only for Dispatch, so "sequence and
//! event name are both present iff op == Dispatch" holds by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};
use crate::protocol::intents::Intents;
use crate::protocol::opcode::OpCode;

/// Decoded gateway envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    op: OpCode,
    data: Value,
    seq: Option<u64>,
    event: Option<String>,
}

impl Envelope {
    /// Non-dispatch envelope. A `DISPATCH` op here is a programming error and is
    /// rejected so the seq/event invariant cannot be broken.
    pub fn new(op: OpCode, data: Value) -> Result<Self> {
        if op == OpCode::DISPATCH {
            return Err(GatewayError::MalformedEnvelope(
                "dispatch envelopes need a sequence number and event name".into(),
            ));
        }
        Ok(Self {
            op,
            data,
            seq: None,
            event: None,
        })
    }

    pub fn dispatch(seq: u64, event: impl Into<String>, data: Value) -> Self {
        Self {
            op: OpCode::DISPATCH,
            data,
            seq: Some(seq),
            event: Some(event.into()),
        }
    }

    /// Heartbeat carrying the last sequence number seen (`null` when none).
    pub fn heartbeat(cursor: Option<u64>) -> Self {
        Self::control(OpCode::HEARTBEAT, cursor.map_or(Value::Null, Value::from))
    }

    pub fn identify(identify: &Identify) -> Result<Self> {
        let data = serde_json::to_value(identify)
            .map_err(|e| GatewayError::MalformedEnvelope(format!("identify encode failed: {e}")))?;
        Ok(Self::control(OpCode::IDENTIFY, data))
    }

    pub fn resume(resume: &Resume) -> Result<Self> {
        let data = serde_json::to_value(resume)
            .map_err(|e| GatewayError::MalformedEnvelope(format!("resume encode failed: {e}")))?;
        Ok(Self::control(OpCode::RESUME, data))
    }

    fn control(op: OpCode, data: Value) -> Self {
        Self {
            op,
            data,
            seq: None,
            event: None,
        }
    }

    pub fn op(&self) -> OpCode {
        self.op
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_data(self) -> Value {
        self.data
    }

    /// Sequence number, only for Dispatch.
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    /// Event name, only for Dispatch.
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn is_dispatch(&self) -> bool {
        self.op == OpCode::DISPATCH
    }
}

/// Inbound wire shape. Unknown top-level fields are ignored: the server owns
/// this format and may extend it. `s`/`t` stay untyped until the op says the
/// frame is a Dispatch.
#[derive(Debug, Deserialize)]
struct WireIn {
    op: i64,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Value,
    #[serde(default)]
    t: Value,
}

#[derive(Debug, Serialize)]
struct WireOut<'a> {
    op: i64,
    d: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    t: Option<&'a str>,
}

/// Decode one text frame.
pub fn decode(raw: &str) -> Result<Envelope> {
    let wire: WireIn = serde_json::from_str(raw)
        .map_err(|e| GatewayError::MalformedEnvelope(format!("invalid envelope json: {e}")))?;

    let op = OpCode(wire.op);
    if op != OpCode::DISPATCH {
        return Ok(Envelope::control(op, wire.d));
    }

    let seq = match wire.s {
        Value::Null => {
            return Err(GatewayError::MalformedEnvelope(
                "dispatch without sequence number".into(),
            ))
        }
        s => s.as_u64().ok_or_else(|| {
            GatewayError::MalformedEnvelope(format!("dispatch sequence is not an unsigned integer: {s}"))
        })?,
    };
    let event = match wire.t {
        Value::String(t) => t,
        Value::Null => {
            return Err(GatewayError::MalformedEnvelope(
                "dispatch without event name".into(),
            ))
        }
        t => {
            return Err(GatewayError::MalformedEnvelope(format!(
                "dispatch event name is not a string: {t}"
            )))
        }
    };
    Ok(Envelope::dispatch(seq, event, wire.d))
}

/// Encode an envelope as a text frame.
pub fn encode(env: &Envelope) -> String {
    let wire = WireOut {
        op: env.op.0,
        d: &env.data,
        s: env.seq,
        t: env.event.as_deref(),
    };
    // Serializing a `Value` tree and primitives into a String cannot fail.
    serde_json::to_string(&wire).unwrap_or_default()
}

/// Identify payload (op 2).
#[derive(Debug, Clone, Serialize)]
pub struct Identify {
    pub token: String,
    pub intents: Intents,
    pub properties: IdentifyProperties,
    pub compress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_threshold: Option<u16>,
}

/// Connection properties reported with Identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "cordgate".into(),
            device: "cordgate".into(),
        }
    }
}

/// Resume payload (op 6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resume {
    pub token: String,
    pub session_id: String,
    pub seq: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_opcode_passes_through() {
        let env = decode(r#"{"op":42,"d":{"x":1}}"#).unwrap();
        assert_eq!(env.op(), OpCode(42));
        assert!(!env.op().is_known());
        assert_eq!(env.data(), &json!({"x": 1}));
        assert!(env.seq().is_none());
    }

    #[test]
    fn null_seq_and_event_on_control_frames_are_dropped() {
        let env = decode(r#"{"op":11,"d":null,"s":null,"t":null}"#).unwrap();
        assert_eq!(env.op(), OpCode::HEARTBEAT_ACK);
        assert!(env.seq().is_none() && env.event().is_none());

        // a stray `s` on a control frame does not make it dispatch-shaped
        let env = decode(r#"{"op":10,"d":{"heartbeat_interval":45000},"s":3}"#).unwrap();
        assert!(env.seq().is_none());

        // nor does a mistyped one make it undecodable
        let env = decode(r#"{"op":11,"d":null,"s":"x","t":7}"#).unwrap();
        assert_eq!(env.op(), OpCode::HEARTBEAT_ACK);
        assert!(env.seq().is_none() && env.event().is_none());
    }

    #[test]
    fn any_integer_op_code_passes_through() {
        let env = decode(r#"{"op":70000,"d":{"x":1}}"#).unwrap();
        assert_eq!(env.op(), OpCode(70000));
        assert_eq!(decode(r#"{"op":-3}"#).unwrap().op(), OpCode(-3));
        assert_eq!(encode(&env), r#"{"op":70000,"d":{"x":1}}"#);

        assert!(decode(r#"{"op":1.5}"#).is_err());
    }

    #[test]
    fn dispatch_requires_seq_and_event() {
        assert!(decode(r#"{"op":0,"d":{},"t":"READY"}"#).is_err());
        assert!(decode(r#"{"op":0,"d":{},"s":1}"#).is_err());
        assert!(decode(r#"{"op":0,"d":{},"s":"1","t":"READY"}"#).is_err());
        assert!(decode(r#"{"op":0,"d":{},"s":-1,"t":"READY"}"#).is_err());
        assert!(decode(r#"{"op":0,"d":{},"s":1,"t":5}"#).is_err());

        let env = decode(r#"{"op":0,"d":{"v":9},"s":1,"t":"READY"}"#).unwrap();
        assert!(env.is_dispatch());
        assert_eq!(env.seq(), Some(1));
        assert_eq!(env.event(), Some("READY"));
    }

    #[test]
    fn heartbeat_encodes_cursor_or_null() {
        assert_eq!(encode(&Envelope::heartbeat(None)), r#"{"op":1,"d":null}"#);
        assert_eq!(encode(&Envelope::heartbeat(Some(7))), r#"{"op":1,"d":7}"#);
    }

    #[test]
    fn dispatch_constructor_cannot_be_bypassed() {
        assert!(Envelope::new(OpCode::DISPATCH, Value::Null).is_err());
        assert!(Envelope::new(OpCode::PRESENCE_UPDATE, json!({})).is_ok());
    }

    #[test]
    fn identify_and_resume_payloads() {
        let ident = Identify {
            token: "t0k".into(),
            intents: Intents::GUILDS | Intents::GUILD_MESSAGES,
            properties: IdentifyProperties {
                os: "linux".into(),
                browser: "b".into(),
                device: "d".into(),
            },
            compress: false,
            large_threshold: None,
        };
        let wire: Value = serde_json::from_str(&encode(&Envelope::identify(&ident).unwrap())).unwrap();
        assert_eq!(wire["op"], 2);
        assert_eq!(wire["d"]["intents"], 513);
        assert_eq!(wire["d"]["token"], "t0k");
        assert!(wire["d"].get("large_threshold").is_none());

        let resume = Resume {
            token: "t0k".into(),
            session_id: "abc".into(),
            seq: 2,
        };
        let wire: Value = serde_json::from_str(&encode(&Envelope::resume(&resume).unwrap())).unwrap();
        assert_eq!(wire, json!({"op": 6, "d": {"token": "t0k", "session_id": "abc", "seq": 2}}));
    }
}
