//! Decode error types.

use thiserror::Error;

use crate::wire_type::WireType;

/// Result type alias for wire operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Errors raised while decoding wire data.
///
/// Every variant aborts the decode of the current top-level message. The
/// caller must drop whatever was built so far.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A read would cross the end of the current range
    #[error("buffer underrun: need {needed} bytes, {remaining} remaining")]
    BufferUnderrun {
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the range
        remaining: usize,
    },

    /// Varint continued past ten bytes
    #[error("malformed varint: more than 10 bytes")]
    MalformedVarint,

    /// Tag carried a group or unassigned wire type
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),

    /// Requested interpretation does not fit the field's wire type
    #[error("cannot read {expected} from a {actual} field")]
    WireTypeMismatch {
        /// What the caller asked for
        expected: &'static str,
        /// Wire type of the current field
        actual: WireType,
    },

    /// A required field never appeared
    #[error("missing required field {message}.{field}")]
    MissingRequiredField {
        /// Message type name
        message: &'static str,
        /// Field name
        field: &'static str,
    },

    /// Tag encoded field number zero or one outside the 29-bit range
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),

    /// String field was not valid UTF-8
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// Nested messages exceeded the depth limit
    #[error("message nesting exceeds {} levels", crate::decoder::MAX_NESTING_DEPTH)]
    RecursionLimitExceeded,

    /// A value accessor was called before the first tag was read
    #[error("no current field")]
    NoCurrentField,
}

impl DecodeError {
    /// Whether the error came from running out of input.
    ///
    /// Truncated buffers always surface as one of these two variants.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::BufferUnderrun { .. } | Self::MalformedVarint)
    }
}
