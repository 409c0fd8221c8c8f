//! Schema model: the subset of `descriptor.proto` the generator reads.
//!
//! These types are decoded with hand-written field dispatch. The generator
//! cannot produce its own input parser, so this module is the bootstrap and
//! stays hand-maintained. Field numbers follow `google/protobuf/descriptor.proto`;
//! everything not listed here (options, source info, services, ...) is skipped
//! as an unknown field.
//!
//! `name` is treated as required on files, messages, fields, enums and enum
//! values. Every real compiler emits it and nothing downstream works without
//! it.

use protolite_wire::{DecodeError, Decoder, Encoder, Message, Result};

/// Field cardinality (`FieldDescriptorProto.Label`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Zero or one occurrence
    Optional = 1,
    /// Exactly one occurrence, enforced after decode
    Required = 2,
    /// Any number of occurrences
    Repeated = 3,
}

impl Label {
    /// Map the descriptor number to a label.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Optional),
            2 => Some(Self::Required),
            3 => Some(Self::Repeated),
            _ => None,
        }
    }

    /// Schema keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Required => "required",
            Self::Repeated => "repeated",
        }
    }
}

/// Scalar kind of a field (`FieldDescriptorProto.Type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FieldType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl FieldType {
    /// Map the descriptor number to a field type.
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            1 => Self::Double,
            2 => Self::Float,
            3 => Self::Int64,
            4 => Self::Uint64,
            5 => Self::Int32,
            6 => Self::Fixed64,
            7 => Self::Fixed32,
            8 => Self::Bool,
            9 => Self::String,
            10 => Self::Group,
            11 => Self::Message,
            12 => Self::Bytes,
            13 => Self::Uint32,
            14 => Self::Enum,
            15 => Self::Sfixed32,
            16 => Self::Sfixed64,
            17 => Self::Sint32,
            18 => Self::Sint64,
            _ => return None,
        })
    }

    /// Lower-case schema spelling, as in `.proto` source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Int32 => "int32",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Group => "group",
            Self::Message => "message",
            Self::Bytes => "bytes",
            Self::Uint32 => "uint32",
            Self::Enum => "enum",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
        }
    }
}

fn missing(message: &'static str, field: &'static str) -> DecodeError {
    DecodeError::MissingRequiredField { message, field }
}

fn read_owned_string(dec: &mut Decoder<'_>) -> Result<String> {
    dec.read_string().map(str::to_owned)
}

/// A set of compiled `.proto` files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptorSet {
    /// 1: files in dependency order
    pub file: Vec<FileDescriptorProto>,
}

impl Message for FileDescriptorSet {
    const NAME: &'static str = "google.protobuf.FileDescriptorSet";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.file.push(dec.read_message()?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        for file in &self.file {
            enc.write_message_field(1, file);
        }
    }
}

/// One compiled `.proto` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDescriptorProto {
    /// 1: file path relative to the import root (required)
    pub name: Option<String>,
    /// 2: package, e.g. `foo.bar`
    pub package: Option<String>,
    /// 4: top-level messages
    pub message_type: Vec<DescriptorProto>,
    /// 5: top-level enums
    pub enum_type: Vec<EnumDescriptorProto>,
}

impl FileDescriptorProto {
    /// File name, empty when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Package, empty when absent.
    pub fn package(&self) -> &str {
        self.package.as_deref().unwrap_or_default()
    }
}

impl Message for FileDescriptorProto {
    const NAME: &'static str = "google.protobuf.FileDescriptorProto";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.name = Some(read_owned_string(dec)?),
            2 => self.package = Some(read_owned_string(dec)?),
            4 => self.message_type.push(dec.read_message()?),
            5 => self.enum_type.push(dec.read_message()?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        if self.name.is_none() {
            return Err(missing(Self::NAME, "name"));
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        if let Some(name) = &self.name {
            enc.write_string_field(1, name);
        }
        if let Some(package) = &self.package {
            enc.write_string_field(2, package);
        }
        for message in &self.message_type {
            enc.write_message_field(4, message);
        }
        for enumeration in &self.enum_type {
            enc.write_message_field(5, enumeration);
        }
    }
}

/// A message type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorProto {
    /// 1: simple name (required)
    pub name: Option<String>,
    /// 2: fields
    pub field: Vec<FieldDescriptorProto>,
    /// 3: messages declared inside this one
    pub nested_type: Vec<DescriptorProto>,
    /// 4: enums declared inside this one
    pub enum_type: Vec<EnumDescriptorProto>,
}

impl DescriptorProto {
    /// Message name, empty when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Message for DescriptorProto {
    const NAME: &'static str = "google.protobuf.DescriptorProto";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.name = Some(read_owned_string(dec)?),
            2 => self.field.push(dec.read_message()?),
            3 => self.nested_type.push(dec.read_message()?),
            4 => self.enum_type.push(dec.read_message()?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        if self.name.is_none() {
            return Err(missing(Self::NAME, "name"));
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        if let Some(name) = &self.name {
            enc.write_string_field(1, name);
        }
        for field in &self.field {
            enc.write_message_field(2, field);
        }
        for nested in &self.nested_type {
            enc.write_message_field(3, nested);
        }
        for enumeration in &self.enum_type {
            enc.write_message_field(4, enumeration);
        }
    }
}

/// A field within a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptorProto {
    /// 1: field name (required)
    pub name: Option<String>,
    /// 3: field number
    pub number: Option<i32>,
    /// 4: raw [`Label`] value
    pub label: Option<i32>,
    /// 5: raw [`FieldType`] value; may be absent when `type_name` is set
    pub r#type: Option<i32>,
    /// 6: referenced message or enum, usually fully qualified (`.pkg.Msg`)
    pub type_name: Option<String>,
    /// 7: default value in text form (C-escaped for bytes)
    pub default_value: Option<String>,
}

impl FieldDescriptorProto {
    /// Field name, empty when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Decoded label, `None` when absent or out of range.
    pub fn label(&self) -> Option<Label> {
        self.label.and_then(Label::from_i32)
    }

    /// Decoded type, `None` when absent or out of range.
    pub fn field_type(&self) -> Option<FieldType> {
        self.r#type.and_then(FieldType::from_i32)
    }
}

impl Message for FieldDescriptorProto {
    const NAME: &'static str = "google.protobuf.FieldDescriptorProto";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.name = Some(read_owned_string(dec)?),
            3 => self.number = Some(dec.read_int32()?),
            4 => self.label = Some(dec.read_enum()?),
            5 => self.r#type = Some(dec.read_enum()?),
            6 => self.type_name = Some(read_owned_string(dec)?),
            7 => self.default_value = Some(read_owned_string(dec)?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        if self.name.is_none() {
            return Err(missing(Self::NAME, "name"));
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        if let Some(name) = &self.name {
            enc.write_string_field(1, name);
        }
        if let Some(number) = self.number {
            enc.write_int32_field(3, number);
        }
        if let Some(label) = self.label {
            enc.write_enum_field(4, label);
        }
        if let Some(kind) = self.r#type {
            enc.write_enum_field(5, kind);
        }
        if let Some(type_name) = &self.type_name {
            enc.write_string_field(6, type_name);
        }
        if let Some(default_value) = &self.default_value {
            enc.write_string_field(7, default_value);
        }
    }
}

/// An enum type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumDescriptorProto {
    /// 1: simple name (required)
    pub name: Option<String>,
    /// 2: values
    pub value: Vec<EnumValueDescriptorProto>,
}

impl EnumDescriptorProto {
    /// Enum name, empty when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Message for EnumDescriptorProto {
    const NAME: &'static str = "google.protobuf.EnumDescriptorProto";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.name = Some(read_owned_string(dec)?),
            2 => self.value.push(dec.read_message()?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        if self.name.is_none() {
            return Err(missing(Self::NAME, "name"));
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        if let Some(name) = &self.name {
            enc.write_string_field(1, name);
        }
        for value in &self.value {
            enc.write_message_field(2, value);
        }
    }
}

/// One named value of an enum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumValueDescriptorProto {
    /// 1: value name (required)
    pub name: Option<String>,
    /// 2: numeric value
    pub number: Option<i32>,
}

impl EnumValueDescriptorProto {
    /// Value name, empty when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Message for EnumValueDescriptorProto {
    const NAME: &'static str = "google.protobuf.EnumValueDescriptorProto";

    fn merge_field(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        match dec.field_number() {
            1 => self.name = Some(read_owned_string(dec)?),
            2 => self.number = Some(dec.read_int32()?),
            _ => dec.skip_field()?,
        }
        Ok(())
    }

    fn check_required(&self) -> Result<()> {
        if self.name.is_none() {
            return Err(missing(Self::NAME, "name"));
        }
        Ok(())
    }

    fn encode_fields(&self, enc: &mut Encoder) {
        if let Some(name) = &self.name {
            enc.write_string_field(1, name);
        }
        if let Some(number) = self.number {
            enc.write_int32_field(2, number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, number: i32, label: Label, kind: FieldType) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_owned()),
            number: Some(number),
            label: Some(label as i32),
            r#type: Some(kind as i32),
            ..Default::default()
        }
    }

    #[test]
    fn field_descriptor_round_trip() {
        let original = FieldDescriptorProto {
            type_name: Some(".pkg.Other".to_owned()),
            default_value: Some("7".to_owned()),
            ..field("count", 3, Label::Optional, FieldType::Int64)
        };

        let decoded = FieldDescriptorProto::decode(&original.encode_to_vec()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.label(), Some(Label::Optional));
        assert_eq!(decoded.field_type(), Some(FieldType::Int64));
    }

    #[test]
    fn nested_descriptor_round_trip() {
        let set = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("a.proto".to_owned()),
                package: Some("pkg".to_owned()),
                message_type: vec![DescriptorProto {
                    name: Some("Outer".to_owned()),
                    field: vec![field("id", 1, Label::Required, FieldType::Uint64)],
                    nested_type: vec![DescriptorProto {
                        name: Some("Inner".to_owned()),
                        ..Default::default()
                    }],
                    enum_type: vec![],
                }],
                enum_type: vec![EnumDescriptorProto {
                    name: Some("Color".to_owned()),
                    value: vec![EnumValueDescriptorProto {
                        name: Some("RED".to_owned()),
                        number: Some(0),
                    }],
                }],
            }],
        };

        assert_eq!(FileDescriptorSet::decode(&set.encode_to_vec()).unwrap(), set);
    }

    #[test]
    fn unnamed_field_rejected() {
        let nameless = FieldDescriptorProto { number: Some(1), ..Default::default() };
        let err = FieldDescriptorProto::decode(&nameless.encode_to_vec()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingRequiredField {
                message: "google.protobuf.FieldDescriptorProto",
                field: "name"
            }
        );
    }

    #[test]
    fn nameless_nested_message_fails_whole_set() {
        let set = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("a.proto".to_owned()),
                message_type: vec![DescriptorProto::default()],
                ..Default::default()
            }],
        };
        let err = FileDescriptorSet::decode(&set.encode_to_vec()).unwrap_err();
        assert!(matches!(err, DecodeError::MissingRequiredField { field: "name", .. }));
    }

    #[test]
    fn out_of_range_enums_are_kept_raw() {
        let odd = FieldDescriptorProto { label: Some(9), r#type: Some(42), ..field("x", 1, Label::Optional, FieldType::Bool) };
        let decoded = FieldDescriptorProto::decode(&odd.encode_to_vec()).unwrap();
        assert_eq!(decoded.label, Some(9));
        assert_eq!(decoded.label(), None);
        assert_eq!(decoded.field_type(), None);
    }
}
