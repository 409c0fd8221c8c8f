//! Schema-less inspection of wire data.
//!
//! Without a schema a LENGTH_DELIMITED value could be a string, a blob, a
//! packed run or an embedded message. [`inspect`] guesses: payloads longer
//! than [`NESTED_PROBE_MIN`] bytes that parse cleanly as fields are shown as
//! nested messages, everything else stays opaque bytes.

use std::fmt::{self, Write as _};

use crate::{
    decoder::{Decoder, MAX_NESTING_DEPTH},
    errors::Result,
    wire_type::WireType,
};

/// Shorter LENGTH_DELIMITED payloads are never probed as messages.
pub const NESTED_PROBE_MIN: usize = 10;

/// One field of an inspected buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    /// Field number from the key
    pub field_number: u32,
    /// Decoded value
    pub value: RawValue,
}

/// Value of an inspected field, by wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// VARINT
    Varint(u64),
    /// FIXED64
    Fixed64(u64),
    /// FIXED32
    Fixed32(u32),
    /// LENGTH_DELIMITED payload that did not look like a message
    Bytes(Vec<u8>),
    /// LENGTH_DELIMITED payload that parsed as fields
    Message {
        /// Payload size in bytes
        len: usize,
        /// Parsed fields
        fields: Vec<RawField>,
    },
}

/// Walk `bytes` as a sequence of fields.
pub fn inspect(bytes: &[u8]) -> Result<Vec<RawField>> {
    inspect_at(bytes, 0)
}

fn inspect_at(bytes: &[u8], depth: usize) -> Result<Vec<RawField>> {
    let mut dec = Decoder::new(bytes);
    let mut fields = Vec::new();

    while let Some(tag) = dec.next_field()? {
        let value = match tag.wire_type {
            WireType::Varint => RawValue::Varint(dec.read_varint()?),
            WireType::Fixed64 => RawValue::Fixed64(dec.read_fixed64()?),
            WireType::Fixed32 => RawValue::Fixed32(dec.read_fixed32()?),
            WireType::LengthDelimited => {
                let payload = dec.read_bytes()?;
                probe_nested(payload, depth)
            },
        };
        fields.push(RawField { field_number: tag.field_number, value });
    }

    Ok(fields)
}

fn probe_nested(payload: &[u8], depth: usize) -> RawValue {
    if payload.len() > NESTED_PROBE_MIN && depth < MAX_NESTING_DEPTH {
        if let Ok(fields) = inspect_at(payload, depth + 1) {
            return RawValue::Message { len: payload.len(), fields };
        }
    }
    RawValue::Bytes(payload.to_vec())
}

/// Render fields as an indented listing, one field per line.
pub fn render(fields: &[RawField]) -> String {
    let mut out = String::new();
    for field in fields {
        // Writing into a String cannot fail
        let _ = write_field(&mut out, field, 0);
    }
    out
}

fn write_field(out: &mut String, field: &RawField, indent: usize) -> fmt::Result {
    let pad = indent * 4;
    let number = field.field_number;
    match &field.value {
        RawValue::Varint(v) => writeln!(out, "{:pad$}#{number} VARINT = {v}", ""),
        RawValue::Fixed64(v) => writeln!(out, "{:pad$}#{number} FIXED64 = {v:#018x}", ""),
        RawValue::Fixed32(v) => writeln!(out, "{:pad$}#{number} FIXED32 = {v:#010x}", ""),
        RawValue::Bytes(bytes) => {
            write!(out, "{:pad$}#{number} BYTES[len={}]", "", bytes.len())?;
            if bytes.len() <= NESTED_PROBE_MIN {
                match std::str::from_utf8(bytes) {
                    Ok(text) if text.chars().all(|c| !c.is_control()) => {
                        write!(out, " = {text:?}")?;
                    },
                    _ => write!(out, " = 0x{}", hex::encode(bytes))?,
                }
            }
            writeln!(out)
        },
        RawValue::Message { len, fields } => {
            writeln!(out, "{:pad$}#{number} MESSAGE[len={len}]", "")?;
            for child in fields {
                write_field(out, child, indent + 1)?;
            }
            Ok(())
        },
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_field(&mut out, self, 0)?;
        f.write_str(out.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::encoder::Encoder;

    #[test]
    fn flat_fields() {
        let bytes = hex!("089601" "120774657374696e67");
        let fields = inspect(&bytes).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, RawValue::Varint(150));
        assert_eq!(fields[1].value, RawValue::Bytes(b"testing".to_vec()));
        assert_eq!(render(&fields), "#1 VARINT = 150\n#2 BYTES[len=7] = \"testing\"\n");
    }

    #[test]
    fn long_payload_probed_as_message() {
        let mut enc = Encoder::new();
        enc.write_tag(3, WireType::LengthDelimited);
        enc.write_length_delimited(|inner| {
            inner.write_varint_field(1, 42);
            inner.write_string_field(2, "hello world");
        });
        let bytes = enc.finalize();

        let fields = inspect(&bytes).unwrap();
        let RawValue::Message { fields: children, .. } = &fields[0].value else {
            panic!("expected nested message, got {:?}", fields[0].value);
        };
        assert_eq!(children[0].value, RawValue::Varint(42));

        let listing = render(&fields);
        assert!(listing.starts_with("#3 MESSAGE[len="));
        assert!(listing.contains("\n    #1 VARINT = 42\n"));
        assert!(listing.contains("\n    #2 BYTES[len=11]\n"));
    }

    #[test]
    fn unparseable_payload_stays_bytes() {
        // 12 bytes of 0xFF cannot be a field sequence
        let mut bytes = vec![0x0A, 12];
        bytes.extend_from_slice(&[0xFF; 12]);
        let fields = inspect(&bytes).unwrap();
        assert_eq!(fields[0].value, RawValue::Bytes(vec![0xFF; 12]));
    }

    #[test]
    fn binary_short_payload_rendered_as_hex() {
        let bytes = hex!("0a020001");
        let fields = inspect(&bytes).unwrap();
        assert_eq!(fields[0].to_string(), "#1 BYTES[len=2] = 0x0001");
    }

    #[test]
    fn truncated_input_fails() {
        assert!(inspect(&hex!("0a05ab")).unwrap_err().is_truncation());
    }
}
