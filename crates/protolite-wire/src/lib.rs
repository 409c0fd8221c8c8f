//! Wire format for protolite.
//!
//! A Protocol Buffers compatible tag-value encoding. Every field on the wire
//! is a varint key `(field_number << 3) | wire_type` followed by a value whose
//! physical shape is chosen by the wire type:
//!
//! ```text
//! 0 VARINT            base-128, 1..=10 bytes
//! 1 FIXED64           8 bytes little-endian
//! 2 LENGTH_DELIMITED  varint length + payload
//! 5 FIXED32           4 bytes little-endian
//! ```
//!
//! The [`Decoder`] walks a borrowed byte slice one field at a time and the
//! [`Encoder`] appends fields to an owned buffer. Message types (hand-written
//! or generated) plug into both through the [`Message`] trait.
//!
//! # Security
//!
//! Input is untrusted. Every read is bounds-checked against the current
//! (sub-)slice, varints longer than ten bytes are rejected, and nested
//! messages are limited to [`MAX_NESTING_DEPTH`] levels. A failed decode
//! discards the partially built value; there is no partial-message recovery.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod inspect;
pub mod message;
pub mod varint;
pub mod wire_type;

pub use decoder::{Decoder, MAX_NESTING_DEPTH};
pub use encoder::{Encoder, FixedWidth, LengthSlot};
pub use errors::{DecodeError, Result};
pub use inspect::{RawField, RawValue, inspect, render};
pub use message::Message;
pub use wire_type::{FieldTag, WireType};
