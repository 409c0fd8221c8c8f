//! The seam between the wire runtime and concrete message types.
//!
//! Hand-written types (such as the descriptor bootstrap) and generated types
//! implement [`Message`] the same way: a field-number dispatch for decoding,
//! a required-field check, and field-by-field encoding.

use bytes::Bytes;

use crate::{decoder::Decoder, encoder::Encoder, errors::Result};

/// A statically shaped message type.
///
/// # Decoding
///
/// [`Message::merge_field`] is called once per field occurrence with the
/// decoder positioned after the key. Implementations match on
/// [`Decoder::field_number`] and call the accessor for the field's kind; the
/// fallback arm must call [`Decoder::skip_field`] so unknown fields are
/// tolerated:
///
/// ```
/// use protolite_wire::{Decoder, Encoder, Message, Result};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: Option<i32>,
///     y: Option<i32>,
/// }
///
/// impl Message for Point {
///     const NAME: &'static str = "Point";
///
///     fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
///         match dec.field_number() {
///             1 => self.x = Some(dec.read_sint32()?),
///             2 => self.y = Some(dec.read_sint32()?),
///             _ => dec.skip_field()?,
///         }
///         Ok(())
///     }
///
///     fn encode_fields(&self, enc: &mut Encoder) {
///         if let Some(x) = self.x {
///             enc.write_zigzag_field(1, i64::from(x));
///         }
///         if let Some(y) = self.y {
///             enc.write_zigzag_field(2, i64::from(y));
///         }
///     }
/// }
///
/// let point = Point { x: Some(-3), y: Some(4) };
/// let bytes = point.encode_to_vec();
/// assert_eq!(Point::decode(&bytes).unwrap(), point);
/// ```
pub trait Message: Default {
    /// Schema name, used in error reports.
    const NAME: &'static str;

    /// Consume the value of the current field.
    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()>;

    /// Fail with `MissingRequiredField` when a required field was never set.
    fn check_required(&self) -> Result<()> {
        Ok(())
    }

    /// Write every present field.
    fn encode_fields(&self, enc: &mut Encoder);

    /// Run the field dispatch until `dec` reaches the end of its range.
    ///
    /// Does not check required fields; callers decide when the message is
    /// complete.
    fn merge_from(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        while dec.next_field()?.is_some() {
            self.merge_field(dec)?;
        }
        Ok(())
    }

    /// Merge the fields in `bytes` into `self`, then check required fields.
    fn merge(&mut self, bytes: &[u8]) -> Result<()> {
        self.merge_from(&mut Decoder::new(bytes))?;
        self.check_required()
    }

    /// Decode a complete message.
    ///
    /// On error the partially decoded value is dropped.
    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        msg.merge(bytes)?;
        Ok(msg)
    }

    /// Encode into a fresh buffer.
    fn encode_to_bytes(&self) -> Bytes {
        let mut enc = Encoder::new();
        self.encode_fields(&mut enc);
        enc.finalize()
    }

    /// Encode into a `Vec<u8>`.
    fn encode_to_vec(&self) -> Vec<u8> {
        self.encode_to_bytes().to_vec()
    }
}
