//! Round trips through generated fixture types.
//!
//! Every message here is produced by the code generator from the harness
//! schema, so these tests exercise the runtime the way real generated code
//! calls it.

use protolite_harness::{
    Defaults, Empty, Envelope, EnvelopeMeta, Header, Lenient, Numbers, Scalars, Strict, Tree,
    Wrapper, color,
};
use protolite_wire::{DecodeError, Decoder, Encoder, Message, WireType};

fn roundtrip<M: Message + std::fmt::Debug + PartialEq>(msg: &M) -> M {
    let bytes = msg.encode_to_vec();
    M::decode(&bytes).unwrap()
}

fn boundary_scalars() -> Vec<Scalars> {
    vec![
        Scalars {
            optional_double: Some(f64::MAX),
            optional_float: Some(f32::MIN_POSITIVE),
            optional_int32: Some(i32::MIN),
            optional_int64: Some(i64::MIN),
            optional_uint32: Some(u32::MAX),
            optional_uint64: Some(u64::MAX),
            optional_sint32: Some(i32::MIN),
            optional_sint64: Some(i64::MIN),
            optional_fixed32: Some(u32::MAX),
            optional_fixed64: Some(u64::MAX),
            optional_sfixed32: Some(i32::MIN),
            optional_sfixed64: Some(i64::MIN),
            optional_bool: Some(true),
            optional_string: Some("héllo wörld".to_owned()),
            optional_bytes: Some(vec![0, 0xFF, 0x80]),
            optional_color: Some(color::BLUE),
        },
        Scalars {
            optional_double: Some(-0.0),
            optional_float: Some(f32::INFINITY),
            optional_int32: Some(-1),
            optional_int64: Some(-1),
            optional_uint32: Some(0),
            optional_uint64: Some(0),
            optional_sint32: Some(i32::MAX),
            optional_sint64: Some(i64::MAX),
            optional_fixed32: Some(0),
            optional_fixed64: Some(0),
            optional_sfixed32: Some(i32::MAX),
            optional_sfixed64: Some(i64::MAX),
            optional_bool: Some(false),
            optional_string: Some(String::new()),
            optional_bytes: Some(Vec::new()),
            optional_color: Some(-7),
        },
        Scalars::default(),
    ]
}

#[test]
fn scalar_boundaries_roundtrip() {
    for msg in boundary_scalars() {
        assert_eq!(roundtrip(&msg), msg);
    }
}

#[test]
fn explicit_zero_is_present() {
    let msg = Scalars { optional_int32: Some(0), optional_string: Some(String::new()), ..Scalars::default() };
    let bytes = msg.encode_to_vec();
    assert_eq!(bytes, [0x18, 0x00, 0x72, 0x00]);

    let decoded = Scalars::decode(&bytes).unwrap();
    assert_eq!(decoded.optional_int32, Some(0));
    assert_eq!(decoded.optional_string.as_deref(), Some(""));
    assert_eq!(decoded.optional_int64, None);
}

#[test]
fn nan_survives() {
    let msg = Scalars { optional_double: Some(f64::NAN), optional_float: Some(f32::NAN), ..Scalars::default() };
    let decoded = roundtrip(&msg);
    assert!(decoded.optional_double.unwrap().is_nan());
    assert!(decoded.optional_float.unwrap().is_nan());
}

#[test]
fn negative_int32_takes_ten_bytes() {
    let msg = Scalars { optional_int32: Some(-1), ..Scalars::default() };
    let bytes = msg.encode_to_vec();
    assert_eq!(bytes.len(), 11);
    assert_eq!(Scalars::decode(&bytes).unwrap().optional_int32, Some(-1));
}

#[test]
fn empty_message_encodes_to_nothing() {
    assert!(Empty::default().encode_to_vec().is_empty());
    assert!(Scalars::default().encode_to_vec().is_empty());
    assert_eq!(Empty::decode(&[]).unwrap(), Empty::default());
}

#[test]
fn multi_megabyte_bytes() {
    let payload: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let msg = Scalars { optional_bytes: Some(payload), ..Scalars::default() };
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn multi_megabyte_string() {
    let text = "grüße, κόσμε, 世界 ".repeat(128 * 1024);
    assert!(text.len() > 3 * 1024 * 1024);
    let msg = Scalars { optional_string: Some(text), ..Scalars::default() };
    assert_eq!(roundtrip(&msg), msg);

    let empty = Scalars { optional_string: Some(String::new()), ..Scalars::default() };
    assert_eq!(roundtrip(&empty).optional_string.as_deref(), Some(""));
}

#[test]
fn ten_megabyte_nested_message_then_sibling() {
    let inner = Scalars { optional_bytes: Some(vec![0xAB; 10 * 1024 * 1024]), ..Scalars::default() };
    let msg = Wrapper { inner: Some(Box::new(inner)), after: Some(7) };

    let decoded = roundtrip(&msg);
    assert_eq!(decoded.after, Some(7));
    assert_eq!(decoded.inner.unwrap().optional_bytes.unwrap().len(), 10 * 1024 * 1024);
}

#[test]
fn unknown_fields_skipped() {
    let mut enc = Encoder::new();
    enc.write_uint64_field(100, 99);
    enc.write_int32_field(1, 5);
    enc.write_fixed_field(101, 1.5f64);
    enc.write_string_field(102, "ignored");
    enc.write_fixed_field(103, 3u32);
    enc.write_string_field(2, "kept");
    enc.write_message_field(104, &Header { id: Some(1), topic: None });
    let bytes = enc.finalize();

    let decoded = Lenient::decode(&bytes).unwrap();
    assert_eq!(decoded, Lenient { a: Some(5), b: Some("kept".to_owned()) });

    // Every field of a Wrapper is unknown to Empty.
    let wrapper = Wrapper { inner: Some(Box::default()), after: Some(1) };
    assert_eq!(Empty::decode(&wrapper.encode_to_vec()).unwrap(), Empty::default());
}

#[test]
fn packed_and_unpacked_decode_equally() {
    let values = [1, -2, 300, i32::MAX, i32::MIN];

    let packed = Numbers { values: values.to_vec(), ..Numbers::default() }.encode_to_vec();
    assert_eq!(packed[0], 0x0A);

    let mut enc = Encoder::new();
    enc.write_unpacked(1, WireType::Varint, &values, Encoder::write_int32);
    let unpacked = enc.finalize();

    let from_packed = Numbers::decode(&packed).unwrap();
    let from_unpacked = Numbers::decode(&unpacked).unwrap();
    assert_eq!(from_packed.values, values);
    assert_eq!(from_packed, from_unpacked);
}

#[test]
fn packed_and_unpacked_mix_in_one_buffer() {
    let mut enc = Encoder::new();
    enc.write_packed(1, &[1, 2], Encoder::write_int32);
    enc.write_int32_field(1, 3);
    enc.write_packed(1, &[4, 5], Encoder::write_int32);
    enc.write_unpacked(2, WireType::Fixed64, &[0.25f64], Encoder::write_fixed::<f64>);
    enc.write_packed(2, &[0.5f64, 1.0], Encoder::write_fixed::<f64>);

    let decoded = Numbers::decode(&enc.finalize()).unwrap();
    assert_eq!(decoded.values, [1, 2, 3, 4, 5]);
    assert_eq!(decoded.weights, [0.25, 0.5, 1.0]);
}

#[test]
fn repeated_and_nested_roundtrip() {
    let msg = Envelope {
        header: Some(Box::new(Header { id: Some(42), topic: Some("news".to_owned()) })),
        payload: Some(b"\x00\x01body".to_vec()),
        tags: vec!["a".to_owned(), String::new(), "c".to_owned()],
        meta: vec![
            EnvelopeMeta { key: Some("k".to_owned()), value: Some(-9) },
            EnvelopeMeta::default(),
        ],
    };
    assert_eq!(roundtrip(&msg), msg);

    let numbers = Numbers {
        values: vec![0, -1, 1 << 20],
        weights: vec![f64::INFINITY, -2.5],
        offsets: vec![i32::MIN, 0],
        colors: vec![color::RED, color::GREEN, 99],
    };
    assert_eq!(roundtrip(&numbers), numbers);
}

#[test]
fn recursive_tree_roundtrip() {
    let leaf = |v| Tree { value: Some(v), ..Tree::default() };
    let msg = Tree {
        value: Some(1),
        children: vec![leaf(2), Tree { children: vec![leaf(3)], ..Tree::default() }],
        left: Some(Box::new(Tree { left: Some(Box::new(leaf(4))), ..Tree::default() })),
    };
    assert_eq!(roundtrip(&msg), msg);
}

#[test]
fn nesting_deeper_than_limit_rejected() {
    let mut tree = Tree::default();
    for _ in 0..=protolite_wire::MAX_NESTING_DEPTH {
        tree = Tree { left: Some(Box::new(tree)), ..Tree::default() };
    }
    let bytes = tree.encode_to_vec();
    assert_eq!(Tree::decode(&bytes), Err(DecodeError::RecursionLimitExceeded));
}

#[test]
fn repeated_singular_message_merges() {
    let mut enc = Encoder::new();
    enc.write_message_field(1, &Header { id: Some(1), topic: Some("first".to_owned()) });
    enc.write_message_field(1, &Header { id: None, topic: Some("second".to_owned()) });

    let decoded = Envelope::decode(&enc.finalize()).unwrap();
    assert_eq!(*decoded.header.unwrap(), Header { id: Some(1), topic: Some("second".to_owned()) });
}

#[test]
fn last_scalar_occurrence_wins() {
    let mut enc = Encoder::new();
    enc.write_int32_field(1, 1);
    enc.write_int32_field(1, 2);
    assert_eq!(Lenient::decode(&enc.finalize()).unwrap().a, Some(2));
}

#[test]
fn required_fields_enforced() {
    let partial = Lenient { a: Some(1), b: None }.encode_to_vec();
    assert_eq!(
        Strict::decode(&partial),
        Err(DecodeError::MissingRequiredField { message: "fixtures.Strict", field: "b" })
    );

    let complete = Lenient { a: Some(1), b: Some("x".to_owned()) }.encode_to_vec();
    assert_eq!(Strict::decode(&complete).unwrap(), Strict { a: Some(1), b: Some("x".to_owned()) });

    // Optional-only types accept the same partial input.
    assert_eq!(Lenient::decode(&partial).unwrap().b, None);
}

#[test]
fn nested_required_fields_enforced() {
    let missing_header = Envelope::default().encode_to_vec();
    assert_eq!(
        Envelope::decode(&missing_header),
        Err(DecodeError::MissingRequiredField { message: "fixtures.Envelope", field: "header" })
    );

    let missing_id = Envelope { header: Some(Box::default()), ..Envelope::default() }.encode_to_vec();
    assert_eq!(
        Envelope::decode(&missing_id),
        Err(DecodeError::MissingRequiredField { message: "fixtures.Header", field: "id" })
    );
}

#[test]
fn wire_type_mismatch_reported() {
    let mut enc = Encoder::new();
    enc.write_string_field(1, "not a number");
    assert!(matches!(
        Lenient::decode(&enc.finalize()),
        Err(DecodeError::WireTypeMismatch { actual: WireType::LengthDelimited, .. })
    ));

    let mut enc = Encoder::new();
    enc.write_int32_field(2, 5);
    assert!(matches!(
        Lenient::decode(&enc.finalize()),
        Err(DecodeError::WireTypeMismatch { actual: WireType::Varint, .. })
    ));
}

#[test]
fn invalid_utf8_rejected() {
    let mut enc = Encoder::new();
    enc.write_bytes_field(2, &[0xC3, 0x28]);
    assert_eq!(Lenient::decode(&enc.finalize()), Err(DecodeError::InvalidUtf8));
}

#[test]
fn accessors_fall_back_to_declared_defaults() {
    let empty = Defaults::default();
    assert_eq!(empty.answer(), 42);
    assert_eq!(empty.greeting(), "hello");
    assert!((empty.ratio() - 0.5).abs() < f64::EPSILON);
    assert!(empty.flag());
    assert_eq!(empty.magic(), [1, 2]);
    assert_eq!(empty.color(), color::BLUE);
    assert_eq!(empty.plain(), 0);

    let set = Defaults { answer: Some(0), greeting: Some(String::new()), ..Defaults::default() };
    assert_eq!(set.answer(), 0);
    assert_eq!(set.greeting(), "");
    assert_eq!(color::name(set.color()), Some("BLUE"));
    assert_eq!(color::name(17), None);
}

#[test]
fn manual_field_walk() {
    let bytes = Header { id: Some(150), topic: Some("t".to_owned()) }.encode_to_vec();
    let mut dec = Decoder::new(&bytes);

    let tag = dec.next_field().unwrap().unwrap();
    assert_eq!((tag.field_number, tag.wire_type), (1, WireType::Varint));
    assert_eq!(dec.read_integral().unwrap(), 150);

    dec.next_field().unwrap().unwrap();
    assert_eq!(dec.read_string().unwrap(), "t");
    assert_eq!(dec.next_field().unwrap(), None);
}
