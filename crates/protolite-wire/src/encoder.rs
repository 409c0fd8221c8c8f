//! Append-only encoder with deferred length prefixes.
//!
//! # Length patching
//!
//! Nested messages are written straight into the parent's buffer, before
//! their size is known. [`Encoder::start_length_delimited`] reserves a
//! ten-byte varint slot and hands back its offset as a [`LengthSlot`];
//! [`Encoder::commit_length_delimited`] later fills the slot with the byte
//! count written since, padded so the slot width never changes:
//!
//! ```text
//! tag | 85 80 80 80 80 80 80 80 80 00 | 5 bytes of nested content | ...
//!       └──────── padded length ─────┘
//! ```
//!
//! Slots are offsets into the buffer rather than references, so they remain
//! valid when the buffer reallocates while the nested content is written.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    message::Message,
    varint::{MAX_VARINT_LEN, encode_padded_varint, encode_varint, zigzag_encode},
    wire_type::{FieldTag, WireType},
};

const INITIAL_CAPACITY: usize = 64;

/// Reserved length prefix awaiting [`Encoder::commit_length_delimited`].
#[derive(Debug)]
#[must_use = "a reserved length slot must be committed"]
pub struct LengthSlot {
    content_start: usize,
}

impl LengthSlot {
    /// Offset of the first content byte after the reserved prefix.
    pub fn content_start(&self) -> usize {
        self.content_start
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for u32 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for u64 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

/// Values with a fixed little-endian wire width.
///
/// Only 4- and 8-byte types implement this, so a write of any other width
/// cannot be expressed.
pub trait FixedWidth: Copy + sealed::Sealed {
    /// FIXED32 or FIXED64.
    const WIRE_TYPE: WireType;

    /// Append the little-endian bytes.
    fn put_le(self, buf: &mut BytesMut);
}

macro_rules! fixed_width {
    ($ty:ty, $wire:ident, $put:ident) => {
        impl FixedWidth for $ty {
            const WIRE_TYPE: WireType = WireType::$wire;

            #[inline]
            fn put_le(self, buf: &mut BytesMut) {
                buf.$put(self);
            }
        }
    };
}

fixed_width!(u32, Fixed32, put_u32_le);
fixed_width!(i32, Fixed32, put_i32_le);
fixed_width!(f32, Fixed32, put_f32_le);
fixed_width!(u64, Fixed64, put_u64_le);
fixed_width!(i64, Fixed64, put_i64_le);
fixed_width!(f64, Fixed64, put_f64_le);

/// Growable output buffer for one top-level encode.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create an encoder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity) }
    }

    /// Bytes written so far (the logical write position).
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View of the bytes written so far.
    ///
    /// Uncommitted length slots read as zeroes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Hand over the encoded bytes. The encoder is consumed.
    pub fn finalize(self) -> Bytes {
        self.buf.freeze()
    }

    // Grow by at least double so repeated small writes stay amortized O(1).
    fn reserve(&mut self, additional: usize) {
        let spare = self.buf.capacity() - self.buf.len();
        if spare < additional {
            self.buf.reserve(additional.max(self.buf.capacity()));
        }
    }

    /// Append raw bytes.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf.put_slice(bytes);
    }

    /// Append a varint.
    pub fn write_varint(&mut self, value: u64) {
        self.reserve(MAX_VARINT_LEN);
        encode_varint(value, &mut self.buf);
    }

    /// Append a zig-zag encoded varint.
    pub fn write_zigzag(&mut self, value: i64) {
        self.write_varint(zigzag_encode(value));
    }

    /// Append a fixed-width little-endian value.
    pub fn write_fixed<T: FixedWidth>(&mut self, value: T) {
        self.reserve(8);
        value.put_le(&mut self.buf);
    }

    /// Append four little-endian bytes.
    pub fn write_fixed32(&mut self, value: u32) {
        self.write_fixed(value);
    }

    /// Append eight little-endian bytes.
    pub fn write_fixed64(&mut self, value: u64) {
        self.write_fixed(value);
    }

    /// Append a field key.
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) {
        self.write_varint(FieldTag::new(field_number, wire_type).to_key());
    }

    /// Reserve a length prefix for content of not yet known size.
    pub fn start_length_delimited(&mut self) -> LengthSlot {
        self.write_raw(&[0u8; MAX_VARINT_LEN]);
        LengthSlot { content_start: self.buf.len() }
    }

    /// Fill a reserved prefix with the number of bytes written since.
    pub fn commit_length_delimited(&mut self, slot: LengthSlot) {
        debug_assert!(slot.content_start >= MAX_VARINT_LEN && slot.content_start <= self.buf.len());

        let len = self.buf.len() - slot.content_start;
        let mut padded = [0u8; MAX_VARINT_LEN];
        encode_padded_varint(len as u64, &mut padded);
        self.buf[slot.content_start - MAX_VARINT_LEN..slot.content_start].copy_from_slice(&padded);
    }

    /// Write length-prefixed content produced by `body`.
    pub fn write_length_delimited(&mut self, body: impl FnOnce(&mut Self)) {
        let slot = self.start_length_delimited();
        body(self);
        self.commit_length_delimited(slot);
    }

    /// `int32` value: negative numbers are sign-extended to ten bytes.
    pub fn write_int32(&mut self, value: i32) {
        self.write_varint(i64::from(value) as u64);
    }

    /// `int64` value.
    pub fn write_int64(&mut self, value: i64) {
        self.write_varint(value as u64);
    }

    /// `uint32` value.
    pub fn write_uint32(&mut self, value: u32) {
        self.write_varint(u64::from(value));
    }

    /// `uint64` value.
    pub fn write_uint64(&mut self, value: u64) {
        self.write_varint(value);
    }

    /// `sint32` value.
    pub fn write_sint32(&mut self, value: i32) {
        self.write_zigzag(i64::from(value));
    }

    /// `sint64` value.
    pub fn write_sint64(&mut self, value: i64) {
        self.write_zigzag(value);
    }

    /// `bool` value.
    pub fn write_bool(&mut self, value: bool) {
        self.write_varint(u64::from(value));
    }

    /// Enum number.
    pub fn write_enum(&mut self, value: i32) {
        self.write_int32(value);
    }

    /// VARINT field.
    pub fn write_varint_field(&mut self, field_number: u32, value: u64) {
        self.write_tag(field_number, WireType::Varint);
        self.write_varint(value);
    }

    /// Zig-zag VARINT field.
    pub fn write_zigzag_field(&mut self, field_number: u32, value: i64) {
        self.write_tag(field_number, WireType::Varint);
        self.write_zigzag(value);
    }

    /// FIXED32 or FIXED64 field, chosen by the value's width.
    pub fn write_fixed_field<T: FixedWidth>(&mut self, field_number: u32, value: T) {
        self.write_tag(field_number, T::WIRE_TYPE);
        self.write_fixed(value);
    }

    /// `int32` field.
    pub fn write_int32_field(&mut self, field_number: u32, value: i32) {
        self.write_tag(field_number, WireType::Varint);
        self.write_int32(value);
    }

    /// `int64` field.
    pub fn write_int64_field(&mut self, field_number: u32, value: i64) {
        self.write_tag(field_number, WireType::Varint);
        self.write_int64(value);
    }

    /// `uint32` field.
    pub fn write_uint32_field(&mut self, field_number: u32, value: u32) {
        self.write_tag(field_number, WireType::Varint);
        self.write_uint32(value);
    }

    /// `uint64` field.
    pub fn write_uint64_field(&mut self, field_number: u32, value: u64) {
        self.write_varint_field(field_number, value);
    }

    /// `sint32` field.
    pub fn write_sint32_field(&mut self, field_number: u32, value: i32) {
        self.write_tag(field_number, WireType::Varint);
        self.write_sint32(value);
    }

    /// `sint64` field.
    pub fn write_sint64_field(&mut self, field_number: u32, value: i64) {
        self.write_zigzag_field(field_number, value);
    }

    /// `bool` field.
    pub fn write_bool_field(&mut self, field_number: u32, value: bool) {
        self.write_tag(field_number, WireType::Varint);
        self.write_bool(value);
    }

    /// Enum field.
    pub fn write_enum_field(&mut self, field_number: u32, value: i32) {
        self.write_int32_field(field_number, value);
    }

    /// `double` field.
    pub fn write_double_field(&mut self, field_number: u32, value: f64) {
        self.write_fixed_field(field_number, value);
    }

    /// `float` field.
    pub fn write_float_field(&mut self, field_number: u32, value: f32) {
        self.write_fixed_field(field_number, value);
    }

    /// Bytes field with an exact length prefix.
    pub fn write_bytes_field(&mut self, field_number: u32, value: &[u8]) {
        self.write_tag(field_number, WireType::LengthDelimited);
        self.write_varint(value.len() as u64);
        self.write_raw(value);
    }

    /// String field.
    pub fn write_string_field(&mut self, field_number: u32, value: &str) {
        self.write_bytes_field(field_number, value.as_bytes());
    }

    /// Embedded message field, encoded in place.
    pub fn write_message_field<M: Message>(&mut self, field_number: u32, value: &M) {
        self.write_tag(field_number, WireType::LengthDelimited);
        self.write_length_delimited(|enc| value.encode_fields(enc));
    }

    /// Repeated scalar field as one packed LENGTH_DELIMITED entry.
    ///
    /// `write` appends one untagged element. Nothing is written for an empty
    /// slice.
    pub fn write_packed<T: Copy>(&mut self, field_number: u32, values: &[T], mut write: impl FnMut(&mut Self, T)) {
        if values.is_empty() {
            return;
        }
        self.write_tag(field_number, WireType::LengthDelimited);
        self.write_length_delimited(|enc| {
            for &value in values {
                write(enc, value);
            }
        });
    }

    /// Repeated scalar field as one tagged entry per element.
    pub fn write_unpacked<T: Copy>(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        values: &[T],
        mut write: impl FnMut(&mut Self, T),
    ) {
        for &value in values {
            self.write_tag(field_number, wire_type);
            write(self, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::decoder::Decoder;

    #[test]
    fn varint_field_bytes() {
        let mut enc = Encoder::new();
        enc.write_varint_field(1, 150);
        assert_eq!(&enc.finalize()[..], hex!("089601"));
    }

    #[test]
    fn negative_int32_is_ten_bytes() {
        let mut enc = Encoder::new();
        enc.write_int32(-1);
        assert_eq!(&enc.finalize()[..], hex!("ffffffffffffffffff01"));
    }

    #[test]
    fn zigzag_minus_one_is_one() {
        let mut enc = Encoder::new();
        enc.write_zigzag(-1);
        assert_eq!(&enc.finalize()[..], hex!("01"));
    }

    #[test]
    fn fixed_width_follows_type() {
        let mut enc = Encoder::new();
        enc.write_fixed_field(1, 1u32);
        enc.write_fixed_field(2, -1i64);
        enc.write_fixed_field(3, 1.0f32);
        assert_eq!(
            &enc.finalize()[..],
            hex!(
                "0d01000000"         // 1: fixed32
                "11ffffffffffffffff" // 2: fixed64
                "1d0000803f"         // 3: float 1.0
            )
        );
    }

    #[test]
    fn committed_slot_is_padded() {
        let mut enc = Encoder::new();
        enc.write_tag(1, WireType::LengthDelimited);
        let slot = enc.start_length_delimited();
        enc.write_raw(b"abc");
        enc.commit_length_delimited(slot);
        assert_eq!(&enc.finalize()[..], hex!("0a 83808080808080808000 616263"));
    }

    #[test]
    fn nested_slots_commit_independently() {
        let mut enc = Encoder::new();
        enc.write_tag(1, WireType::LengthDelimited);
        let outer = enc.start_length_delimited();
        enc.write_tag(2, WireType::LengthDelimited);
        let inner = enc.start_length_delimited();
        enc.write_raw(b"xy");
        enc.commit_length_delimited(inner);
        enc.write_varint_field(3, 7);
        enc.commit_length_delimited(outer);
        let bytes = enc.finalize();

        let mut dec = Decoder::new(&bytes);
        dec.next_field().unwrap();
        let outer = dec.read_bytes().unwrap();
        // inner key + slot + "xy" + field 3
        assert_eq!(outer.len(), 1 + MAX_VARINT_LEN + 2 + 2);

        let mut dec = Decoder::new(outer);
        dec.next_field().unwrap();
        assert_eq!(dec.read_bytes().unwrap(), b"xy");
        dec.next_field().unwrap();
        assert_eq!(dec.read_integral().unwrap(), 7);
    }

    #[test]
    fn slot_survives_reallocation() {
        let mut enc = Encoder::with_capacity(1);
        enc.write_tag(1, WireType::LengthDelimited);
        let slot = enc.start_length_delimited();
        let payload = vec![0xAB; 4096];
        enc.write_raw(&payload);
        enc.commit_length_delimited(slot);
        enc.write_varint_field(2, 1);
        let bytes = enc.finalize();

        let mut dec = Decoder::new(&bytes);
        dec.next_field().unwrap();
        assert_eq!(dec.read_bytes().unwrap(), &payload[..]);
        dec.next_field().unwrap();
        assert_eq!(dec.read_integral().unwrap(), 1);
    }

    #[test]
    fn empty_packed_writes_nothing() {
        let mut enc = Encoder::new();
        enc.write_packed(4, &[] as &[i32], Encoder::write_int32);
        assert!(enc.is_empty());
    }

    #[test]
    fn packed_layout() {
        let mut enc = Encoder::new();
        enc.write_packed(4, &[3i32, 270, 86942], Encoder::write_int32);
        let bytes = enc.finalize();
        assert_eq!(bytes[0], 0x22);
        assert_eq!(&bytes[1 + MAX_VARINT_LEN..], hex!("038e029ea705"));
    }
}
