//! Wire types and field keys.

use std::fmt;

use crate::errors::{DecodeError, Result};

/// Largest field number the format allows (2^29 - 1).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Physical encoding of a field value.
///
/// Values 3 and 4 (START_GROUP/END_GROUP) are legacy and rejected, as are 6
/// and 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint
    Varint = 0,
    /// 8 bytes little-endian
    Fixed64 = 1,
    /// Varint length followed by that many bytes
    LengthDelimited = 2,
    /// 4 bytes little-endian
    Fixed32 = 5,
}

impl WireType {
    /// Convert the low three bits of a key into a wire type.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::UnsupportedWireType(other)),
        }
    }

    /// Raw 3-bit value.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Varint => "VARINT",
            Self::Fixed64 => "FIXED64",
            Self::LengthDelimited => "LENGTH_DELIMITED",
            Self::Fixed32 => "FIXED32",
        };
        f.write_str(name)
    }
}

/// Field number plus wire type, as carried by one key varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldTag {
    /// Field number (1..=2^29-1)
    pub field_number: u32,
    /// Encoding of the value that follows
    pub wire_type: WireType,
}

impl FieldTag {
    /// Create a tag.
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        Self { field_number, wire_type }
    }

    /// Split a key varint into its field number and wire type.
    pub fn from_key(key: u64) -> Result<Self> {
        let wire_type = WireType::from_u8((key & 7) as u8)?;
        let field_number = key >> 3;
        if field_number == 0 || field_number > u64::from(MAX_FIELD_NUMBER) {
            return Err(DecodeError::InvalidFieldNumber(field_number));
        }
        Ok(Self { field_number: field_number as u32, wire_type })
    }

    /// Key varint value: `field_number * 8 + wire_type`.
    pub fn to_key(self) -> u64 {
        (u64::from(self.field_number) << 3) | u64::from(self.wire_type.to_u8())
    }
}
