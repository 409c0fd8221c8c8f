//! Every strict prefix of a single-field message must fail as truncated.

use protolite_harness::{Envelope, Header, Numbers, Scalars, Wrapper, color};
use protolite_wire::{DecodeError, Message};

fn full_scalars() -> Scalars {
    Scalars {
        optional_double: Some(1.25),
        optional_float: Some(-3.5),
        optional_int32: Some(-1),
        optional_int64: Some(1 << 40),
        optional_uint32: Some(300),
        optional_uint64: Some(u64::MAX),
        optional_sint32: Some(-64),
        optional_sint64: Some(i64::MIN),
        optional_fixed32: Some(7),
        optional_fixed64: Some(8),
        optional_sfixed32: Some(-9),
        optional_sfixed64: Some(-10),
        optional_bool: Some(true),
        optional_string: Some("truncate me".to_owned()),
        optional_bytes: Some(vec![1, 2, 3, 4]),
        optional_color: Some(color::GREEN),
    }
}

fn assert_every_prefix_truncated<M: Message + std::fmt::Debug>(bytes: &[u8]) {
    assert!(!bytes.is_empty());
    for cut in 1..bytes.len() {
        match M::decode(&bytes[..cut]) {
            Err(err) => assert!(err.is_truncation(), "cut at {cut} of {}: {err}", bytes.len()),
            Ok(msg) => panic!("cut at {cut} of {} decoded: {msg:?}", bytes.len()),
        }
    }
}

#[test]
fn nested_message_truncated_everywhere() {
    let msg = Wrapper { inner: Some(Box::new(full_scalars())), after: None };
    let bytes = msg.encode_to_vec();
    assert_every_prefix_truncated::<Wrapper>(&bytes);
    assert_eq!(Wrapper::decode(&bytes).unwrap(), msg);
}

#[test]
fn packed_run_truncated_everywhere() {
    let msg = Numbers { values: vec![1, -1, 1 << 30, 0, 127], ..Numbers::default() };
    assert_every_prefix_truncated::<Numbers>(&msg.encode_to_vec());

    let msg = Numbers { weights: vec![0.5, -0.5], ..Numbers::default() };
    assert_every_prefix_truncated::<Numbers>(&msg.encode_to_vec());
}

#[test]
fn required_header_truncated_everywhere() {
    let msg = Envelope {
        header: Some(Box::new(Header { id: Some(u64::MAX), topic: Some("topic".to_owned()) })),
        ..Envelope::default()
    };
    assert_every_prefix_truncated::<Envelope>(&msg.encode_to_vec());
}

#[test]
fn truncated_scalar_reports_counts() {
    // optional_fixed64 (field 10): key 0x51 then eight bytes.
    let msg = Scalars { optional_fixed64: Some(8), ..Scalars::default() };
    let bytes = msg.encode_to_vec();
    assert_eq!(bytes.len(), 9);
    assert_eq!(
        Scalars::decode(&bytes[..5]),
        Err(DecodeError::BufferUnderrun { needed: 8, remaining: 4 })
    );
}

#[test]
fn overlong_varint_is_malformed() {
    // optional_int32 (field 3) with an eleven-byte varint.
    let mut bytes = vec![0x18];
    bytes.extend_from_slice(&[0xFF; 10]);
    bytes.push(0x01);
    assert_eq!(Scalars::decode(&bytes), Err(DecodeError::MalformedVarint));
}

#[test]
fn reserved_wire_types_rejected() {
    // Field 1 with wire types 3, 4, 6 and 7.
    for key in [0x0B, 0x0C, 0x0E, 0x0F] {
        assert!(matches!(Scalars::decode(&[key, 0]), Err(DecodeError::UnsupportedWireType(_))));
    }
}

#[test]
fn field_number_zero_rejected() {
    assert_eq!(Scalars::decode(&[0x00, 0x01]), Err(DecodeError::InvalidFieldNumber(0)));
}
