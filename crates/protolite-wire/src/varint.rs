//! Base-128 varints and the zig-zag transform.
//!
//! A varint stores seven bits per byte, least significant group first, with
//! the high bit of each byte set when another byte follows. Ten bytes cover a
//! full 64-bit value (the tenth carries only the top bit).

use bytes::BufMut;

use crate::errors::{DecodeError, Result};

/// Most bytes a 64-bit varint can occupy.
pub const MAX_VARINT_LEN: usize = 10;

/// Append the canonical encoding of `value`.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Decode a varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
#[inline]
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if bytes.len() >= MAX_VARINT_LEN {
        Err(DecodeError::MalformedVarint)
    } else {
        Err(DecodeError::BufferUnderrun { needed: bytes.len() + 1, remaining: bytes.len() })
    }
}

/// Number of bytes `encode_varint` writes for `value`.
#[inline]
pub fn encoded_len(value: u64) -> usize {
    // ceil(significant_bits / 7), with zero still taking one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Write `value` into exactly [`MAX_VARINT_LEN`] bytes.
///
/// The first nine bytes always carry the continuation bit, so the slot width
/// is fixed regardless of magnitude. Decoders accept the padded form.
#[inline]
pub fn encode_padded_varint(mut value: u64, slot: &mut [u8; MAX_VARINT_LEN]) {
    for byte in slot.iter_mut().take(MAX_VARINT_LEN - 1) {
        *byte = (value as u8 & 0x7F) | 0x80;
        value >>= 7;
    }
    slot[MAX_VARINT_LEN - 1] = value as u8;
}

/// Fold the sign into bit 0: `(v << 1) ^ (v >> 63)`.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`]: `(v >> 1) ^ -(v & 1)`.
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
