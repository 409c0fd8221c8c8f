//! Field-at-a-time decoder over a borrowed byte range.
//!
//! # Architecture
//!
//! A [`Decoder`] is a cursor over a caller-owned `&[u8]`. Reading a tag with
//! [`Decoder::next_field`] makes it the *current field*; the typed readers
//! then interpret the value that follows according to the current field's
//! wire type, never according to a type hint from the caller:
//!
//! ```text
//! read_integral   VARINT | FIXED64 | FIXED32
//! read_zigzag     VARINT (zig-zag) | FIXED64 | FIXED32 (raw signed)
//! read_floating   FIXED64 (double) | FIXED32 (single)
//! read_bytes      LENGTH_DELIMITED
//! read_message    LENGTH_DELIMITED, recursive sub-decoder
//! ```
//!
//! Nested messages and packed runs get their own sub-decoder scoped to
//! exactly the declared length. Sub-decoders borrow the same backing slice,
//! nothing is copied and nothing is ever written.

use crate::{
    errors::{DecodeError, Result},
    message::Message,
    varint::{decode_varint, zigzag_decode},
    wire_type::{FieldTag, WireType},
};

/// Deepest nesting of length-delimited messages a decode will follow.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Cursor over an immutable byte range.
///
/// The read position never leaves `0..=buf.len()`; a read that would cross
/// the end fails with [`DecodeError::BufferUnderrun`] without moving.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    current: Option<FieldTag>,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `buf`, positioned at its start.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, current: None, depth: 0 }
    }

    fn nested(buf: &'a [u8], current: Option<FieldTag>, depth: usize) -> Self {
        Self { buf, pos: 0, current, depth }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the range.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when the cursor sits at the end of the range.
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Nesting depth of this decoder (0 for a top-level message).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Read the next field key.
    ///
    /// Returns `Ok(None)` exactly when the cursor is at the end of the range.
    /// Otherwise the tag becomes the current field and is returned.
    pub fn next_field(&mut self) -> Result<Option<FieldTag>> {
        if self.is_at_end() {
            self.current = None;
            return Ok(None);
        }

        let key = self.read_varint()?;
        let tag = FieldTag::from_key(key)?;
        self.current = Some(tag);
        Ok(Some(tag))
    }

    /// Current field tag, if a key has been read.
    pub fn current_tag(&self) -> Option<FieldTag> {
        self.current
    }

    /// Field number of the current field (0 before the first key).
    pub fn field_number(&self) -> u32 {
        self.current.map_or(0, |tag| tag.field_number)
    }

    /// Wire type of the current field.
    pub fn wire_type(&self) -> Option<WireType> {
        self.current.map(|tag| tag.wire_type)
    }

    fn current_wire_type(&self) -> Result<WireType> {
        self.wire_type().ok_or(DecodeError::NoCurrentField)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::BufferUnderrun { needed: len, remaining });
        }

        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    fn take_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let remaining = self.remaining();
        let len = usize::try_from(len)
            .map_err(|_| DecodeError::BufferUnderrun { needed: usize::MAX, remaining })?;
        self.take(len)
    }

    /// Read one raw varint at the cursor.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_varint(&self.buf[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read exactly four little-endian bytes.
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    /// Read exactly eight little-endian bytes.
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(raw))
    }

    /// Integral value of the current field.
    ///
    /// VARINT reads a varint, FIXED64/FIXED32 read 8/4 little-endian bytes
    /// (zero-extended).
    pub fn read_integral(&mut self) -> Result<u64> {
        match self.current_wire_type()? {
            WireType::Varint => self.read_varint(),
            WireType::Fixed64 => self.read_fixed64(),
            WireType::Fixed32 => self.read_fixed32().map(u64::from),
            actual @ WireType::LengthDelimited => {
                Err(DecodeError::WireTypeMismatch { expected: "integer", actual })
            },
        }
    }

    /// Signed value of the current field.
    ///
    /// VARINT is zig-zag decoded. FIXED64/FIXED32 are raw signed
    /// little-endian values without the zig-zag transform.
    pub fn read_zigzag(&mut self) -> Result<i64> {
        match self.current_wire_type()? {
            WireType::Varint => self.read_varint().map(zigzag_decode),
            WireType::Fixed64 => self.read_fixed64().map(|v| v as i64),
            WireType::Fixed32 => self.read_fixed32().map(|v| i64::from(v as i32)),
            actual @ WireType::LengthDelimited => {
                Err(DecodeError::WireTypeMismatch { expected: "zig-zag integer", actual })
            },
        }
    }

    /// IEEE-754 value of the current field: FIXED64 is a double, FIXED32 a
    /// single widened to `f64`.
    pub fn read_floating(&mut self) -> Result<f64> {
        match self.current_wire_type()? {
            WireType::Fixed64 => self.read_fixed64().map(f64::from_bits),
            WireType::Fixed32 => self.read_fixed32().map(|v| f64::from(f32::from_bits(v))),
            actual => Err(DecodeError::WireTypeMismatch { expected: "floating point", actual }),
        }
    }

    /// Payload of a LENGTH_DELIMITED field, borrowed from the input.
    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        match self.current_wire_type()? {
            WireType::LengthDelimited => self.take_length_prefixed(),
            actual => Err(DecodeError::WireTypeMismatch { expected: "byte sequence", actual }),
        }
    }

    /// Payload of a LENGTH_DELIMITED field as UTF-8 text.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let raw = self.read_bytes()?;
        std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Decode the current LENGTH_DELIMITED field as a fresh `M`.
    pub fn read_message<M: Message>(&mut self) -> Result<M> {
        let mut msg = M::default();
        self.merge_message(&mut msg)?;
        Ok(msg)
    }

    /// Decode the current LENGTH_DELIMITED field into an existing `M`.
    ///
    /// Fields present in the payload overwrite (singular) or extend
    /// (repeated) what `msg` already holds. Required fields are checked once
    /// the sub-range is exhausted.
    pub fn merge_message<M: Message>(&mut self, msg: &mut M) -> Result<()> {
        let actual = self.current_wire_type()?;
        if actual != WireType::LengthDelimited {
            return Err(DecodeError::WireTypeMismatch { expected: "message", actual });
        }
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::RecursionLimitExceeded);
        }

        let payload = self.take_length_prefixed()?;
        let mut sub = Decoder::nested(payload, None, self.depth + 1);
        msg.merge_from(&mut sub)?;
        msg.check_required()
    }

    /// Append one or more values of a repeated packable field.
    ///
    /// A LENGTH_DELIMITED occurrence is a packed run: `read` is called on a
    /// sub-decoder whose current wire type is `packed` until the run is
    /// exhausted. Any other wire type is a single tagged value. Both forms
    /// may be mixed for the same field within one buffer.
    pub fn read_repeated<T, F>(&mut self, packed: WireType, out: &mut Vec<T>, mut read: F) -> Result<()>
    where
        F: FnMut(&mut Decoder<'a>) -> Result<T>,
    {
        let wire_type = self.current_wire_type()?;
        if wire_type == WireType::LengthDelimited && packed != WireType::LengthDelimited {
            let run = self.take_length_prefixed()?;
            let tag = FieldTag::new(self.field_number(), packed);
            let mut sub = Decoder::nested(run, Some(tag), self.depth);
            while !sub.is_at_end() {
                out.push(read(&mut sub)?);
            }
            return Ok(());
        }

        out.push(read(self)?);
        Ok(())
    }

    /// Move past the current field's value without interpreting it.
    pub fn skip_field(&mut self) -> Result<()> {
        match self.current_wire_type()? {
            WireType::Varint => self.read_varint().map(drop),
            WireType::Fixed64 => self.take(8).map(drop),
            WireType::Fixed32 => self.take(4).map(drop),
            WireType::LengthDelimited => self.take_length_prefixed().map(drop),
        }
    }

    /// `int32`: integral value truncated to 32 bits.
    pub fn read_int32(&mut self) -> Result<i32> {
        self.read_integral().map(|v| v as i32)
    }

    /// `int64`
    pub fn read_int64(&mut self) -> Result<i64> {
        self.read_integral().map(|v| v as i64)
    }

    /// `uint32`
    pub fn read_uint32(&mut self) -> Result<u32> {
        self.read_integral().map(|v| v as u32)
    }

    /// `uint64`
    pub fn read_uint64(&mut self) -> Result<u64> {
        self.read_integral()
    }

    /// `sint32`: zig-zag value truncated to 32 bits.
    pub fn read_sint32(&mut self) -> Result<i32> {
        self.read_zigzag().map(|v| v as i32)
    }

    /// `sint64`
    pub fn read_sint64(&mut self) -> Result<i64> {
        self.read_zigzag()
    }

    /// `fixed32` field value.
    pub fn read_fixed32_value(&mut self) -> Result<u32> {
        self.read_integral().map(|v| v as u32)
    }

    /// `fixed64` field value.
    pub fn read_fixed64_value(&mut self) -> Result<u64> {
        self.read_integral()
    }

    /// `sfixed32`: raw 32-bit two's complement.
    pub fn read_sfixed32(&mut self) -> Result<i32> {
        self.read_integral().map(|v| v as i32)
    }

    /// `sfixed64`: raw 64-bit two's complement.
    pub fn read_sfixed64(&mut self) -> Result<i64> {
        self.read_integral().map(|v| v as i64)
    }

    /// `bool`: any non-zero integral value is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_integral().map(|v| v != 0)
    }

    /// Enum number, kept open as `i32` so unknown values survive.
    pub fn read_enum(&mut self) -> Result<i32> {
        self.read_int32()
    }

    /// `double`
    pub fn read_double(&mut self) -> Result<f64> {
        self.read_floating()
    }

    /// `float`
    pub fn read_float(&mut self) -> Result<f32> {
        self.read_floating().map(|v| v as f32)
    }
}
