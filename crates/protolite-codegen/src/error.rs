//! Generation error types.

use protolite_wire::DecodeError;
use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Errors raised while reading a descriptor set or generating code from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// Descriptor set bytes did not decode
    #[error("descriptor set decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Schema uses a construct the generator refuses to emit
    #[error("{message}.{field}: {construct} fields are not supported")]
    UnsupportedSchemaConstruct {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Offending construct
        construct: &'static str,
    },

    /// `type_name` does not name a known message or enum
    #[error("{message}.{field}: unresolved type {type_name}")]
    UnresolvedType {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Referenced name as written in the descriptor
        type_name: String,
    },

    /// Field carries neither a scalar type nor a `type_name`
    #[error("{message}.{field}: field has no type")]
    MissingFieldType {
        /// Message full name
        message: String,
        /// Field name
        field: String,
    },

    /// Field carries no label
    #[error("{message}.{field}: field has no label")]
    MissingLabel {
        /// Message full name
        message: String,
        /// Field name
        field: String,
    },

    /// Field type number outside 1..=18
    #[error("{message}.{field}: unknown field type {value}")]
    UnknownFieldType {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Raw value
        value: i32,
    },

    /// Label number outside 1..=3
    #[error("{message}.{field}: unknown label {value}")]
    UnknownLabel {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Raw value
        value: i32,
    },

    /// Field number missing or outside the valid range
    #[error("{message}.{field}: invalid field number {value}")]
    InvalidFieldNumber {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Raw value (0 when absent)
        value: i32,
    },

    /// Default value does not parse for the field's kind
    #[error("{message}.{field}: invalid default value {value:?}")]
    InvalidDefault {
        /// Message full name
        message: String,
        /// Field name
        field: String,
        /// Default as written in the descriptor
        value: String,
    },

    /// Two schema types flatten to the same generated Rust name
    #[error("{first} and {second} both generate {rust_name}")]
    NameCollision {
        /// Generated struct or module name
        rust_name: String,
        /// Schema type that claimed the name first
        first: String,
        /// Schema type that collided with it
        second: String,
    },

    /// Writing generated source failed
    #[error("formatting generated source failed")]
    Format,
}

impl From<std::fmt::Error> for GenerateError {
    fn from(_: std::fmt::Error) -> Self {
        Self::Format
    }
}
