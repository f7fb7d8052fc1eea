//! Envelope codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use cordgate_core::protocol::envelope::{decode, encode, Envelope};
use cordgate_core::protocol::OpCode;

use vector_loader::load;

#[test]
fn envelope_vectors() {
    let files = [
        "hello.json",
        "dispatch_ready.json",
        "heartbeat_ack.json",
        "unknown_opcode.json",
        "invalid_session.json",
        "not_json.json",
        "missing_op.json",
        "op_not_integer.json",
        "dispatch_without_seq.json",
        "wide_opcode.json",
        "negative_opcode.json",
        "ack_with_stray_seq.json",
        "dispatch_seq_not_integer.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(env.op().0, ex["op"].as_i64().unwrap(), "vector={}", v.description);
        assert_eq!(env.seq(), ex["seq"].as_u64(), "vector={}", v.description);
        assert_eq!(env.event(), ex["event"].as_str(), "vector={}", v.description);
        assert_eq!(env.data(), &ex["data"], "vector={}", v.description);
    }
}

#[test]
fn decoded_dispatch_reencodes_to_the_same_fields() {
    let v = load("dispatch_ready.json");
    let env = decode(&v.frame).unwrap();
    let again = decode(&encode(&env)).unwrap();
    assert_eq!(env, again);
}

#[test]
fn outbound_control_frames_omit_seq_and_event() {
    let env = Envelope::new(OpCode::PRESENCE_UPDATE, serde_json::json!({"status": "idle"})).unwrap();
    let wire: serde_json::Value = serde_json::from_str(&encode(&env)).unwrap();
    assert_eq!(wire, serde_json::json!({"op": 3, "d": {"status": "idle"}}));
}
