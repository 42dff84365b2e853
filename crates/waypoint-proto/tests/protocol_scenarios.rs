//! Integration tests pinning the boundary behaviors from the specification's
//! "Testable Properties" section against the framer and validator together.

use waypoint_proto::{
    ClientMessage, Expected, FrameOutcome, ProtocolError, classify, max_len_for, next_frame,
    validate_key_id,
};

const TERM: &[u8] = b"\x07\x08";

#[test]
fn username_of_eighteen_bytes_is_accepted() {
    let username = vec![b'a'; 18];
    let mut buf = username.clone();
    buf.extend_from_slice(TERM);

    let max_len = max_len_for(Expected::Username);
    let frame = next_frame(&mut buf, TERM, max_len).unwrap();
    let payload = match frame {
        FrameOutcome::Frame(p) => p,
        FrameOutcome::Incomplete => panic!("expected a complete frame"),
    };

    assert_eq!(classify(&payload, Expected::Username).unwrap(), ClientMessage::Username(username));
}

#[test]
fn nineteen_byte_username_rejected_before_terminator_arrives() {
    let max_len = max_len_for(Expected::Username);
    let mut buf = vec![b'a'; 19];
    let err = next_frame(&mut buf, TERM, max_len).unwrap_err();
    assert!(matches!(err, ProtocolError::Syntax { .. }));
}

#[test]
fn key_id_minus_one_is_out_of_range_not_syntax() {
    let mut buf = b"-1".to_vec();
    buf.extend_from_slice(TERM);

    let max_len = max_len_for(Expected::KeyId);
    let payload = match next_frame(&mut buf, TERM, max_len).unwrap() {
        FrameOutcome::Frame(p) => p,
        FrameOutcome::Incomplete => panic!("expected a complete frame"),
    };

    let ClientMessage::KeyId(key_id) = classify(&payload, Expected::KeyId).unwrap() else {
        panic!("expected KeyId")
    };
    assert_eq!(key_id, -1);

    let err = validate_key_id(key_id, 1).unwrap_err();
    assert!(matches!(err, ProtocolError::KeyOutOfRange { .. }));
}

#[test]
fn split_and_coalesced_reads_recover_username_then_key_id() {
    // "Oompa Loompa\a\b0\a\b" delivered as "Oompa Lo" then "ompa\a\b0\a\b".
    let mut buf = b"Oompa Lo".to_vec();

    let username_max = max_len_for(Expected::Username);
    assert_eq!(next_frame(&mut buf, TERM, username_max).unwrap(), FrameOutcome::Incomplete);

    buf.extend_from_slice(b"ompa\x07\x080\x07\x08");

    let username_frame = next_frame(&mut buf, TERM, username_max).unwrap();
    let FrameOutcome::Frame(username_payload) = username_frame else {
        panic!("expected complete username frame")
    };
    assert_eq!(
        classify(&username_payload, Expected::Username).unwrap(),
        ClientMessage::Username(b"Oompa Loompa".to_vec())
    );

    let key_id_max = max_len_for(Expected::KeyId);
    let key_id_frame = next_frame(&mut buf, TERM, key_id_max).unwrap();
    let FrameOutcome::Frame(key_id_payload) = key_id_frame else {
        panic!("expected complete key id frame")
    };
    assert_eq!(classify(&key_id_payload, Expected::KeyId).unwrap(), ClientMessage::KeyId(0));
    assert!(buf.is_empty());
}

#[test]
fn recharging_is_admissible_while_awaiting_any_other_kind() {
    for expected in [Expected::Username, Expected::KeyId, Expected::Confirmation, Expected::Ok] {
        assert_eq!(classify(b"RECHARGING", expected).unwrap(), ClientMessage::Recharging);
    }
}
