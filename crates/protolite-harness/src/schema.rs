//! The fixture schema, built directly as descriptors.
//!
//! Equivalent `.proto` source (package `fixtures`):
//!
//! ```text
//! enum Color { RED = 0; GREEN = 1; BLUE = 2; }
//!
//! message Scalars {                      // every scalar kind, optional 1..=16
//!   optional double optional_double = 1; ... optional Color optional_color = 16;
//! }
//! message Header   { required uint64 id = 1; optional string topic = 2; }
//! message Envelope {
//!   message Meta { optional string key = 1; optional int64 value = 2; }
//!   required Header header = 1; optional bytes payload = 2;
//!   repeated string tags = 3; repeated Meta meta = 4;
//! }
//! message Numbers  { repeated int32 values = 1; repeated double weights = 2;
//!                    repeated sfixed32 offsets = 3; repeated Color colors = 4; }
//! message Tree     { optional int32 value = 1; repeated Tree children = 2; optional Tree left = 3; }
//! message Defaults { optional int32 answer = 1 [default = 42]; ... }
//! message Strict   { required int32 a = 1; required string b = 2; }
//! message Lenient  { optional int32 a = 1; optional string b = 2; }
//! message Wrapper  { optional Scalars inner = 1; optional uint32 after = 2; }
//! message Empty    { }
//! ```

use protolite_codegen::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldType, FileDescriptorProto, FileDescriptorSet, Label,
};

/// Descriptor set for the whole fixture schema.
pub fn fixture_set() -> FileDescriptorSet {
    FileDescriptorSet { file: vec![fixture_file()] }
}

/// The single fixture file.
pub fn fixture_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some("fixtures.proto".to_owned()),
        package: Some("fixtures".to_owned()),
        message_type: vec![
            scalars(),
            message("Header", vec![
                required("id", 1, FieldType::Uint64),
                optional("topic", 2, FieldType::String),
            ]),
            envelope(),
            message("Numbers", vec![
                repeated("values", 1, FieldType::Int32),
                repeated("weights", 2, FieldType::Double),
                repeated("offsets", 3, FieldType::Sfixed32),
                typed(repeated("colors", 4, FieldType::Enum), ".fixtures.Color"),
            ]),
            message("Tree", vec![
                optional("value", 1, FieldType::Int32),
                typed(repeated("children", 2, FieldType::Message), ".fixtures.Tree"),
                typed(optional("left", 3, FieldType::Message), "Tree"),
            ]),
            defaults(),
            message("Strict", vec![
                required("a", 1, FieldType::Int32),
                required("b", 2, FieldType::String),
            ]),
            message("Lenient", vec![
                optional("a", 1, FieldType::Int32),
                optional("b", 2, FieldType::String),
            ]),
            message("Wrapper", vec![
                typed(optional("inner", 1, FieldType::Message), ".fixtures.Scalars"),
                optional("after", 2, FieldType::Uint32),
            ]),
            message("Empty", vec![]),
        ],
        enum_type: vec![enumeration("Color", &[("RED", 0), ("GREEN", 1), ("BLUE", 2)])],
    }
}

fn scalars() -> DescriptorProto {
    let kinds = [
        ("optional_double", FieldType::Double),
        ("optional_float", FieldType::Float),
        ("optional_int32", FieldType::Int32),
        ("optional_int64", FieldType::Int64),
        ("optional_uint32", FieldType::Uint32),
        ("optional_uint64", FieldType::Uint64),
        ("optional_sint32", FieldType::Sint32),
        ("optional_sint64", FieldType::Sint64),
        ("optional_fixed32", FieldType::Fixed32),
        ("optional_fixed64", FieldType::Fixed64),
        ("optional_sfixed32", FieldType::Sfixed32),
        ("optional_sfixed64", FieldType::Sfixed64),
        ("optional_bool", FieldType::Bool),
        ("optional_string", FieldType::String),
        ("optional_bytes", FieldType::Bytes),
    ];
    let mut fields: Vec<FieldDescriptorProto> =
        (1..).zip(kinds).map(|(number, (name, kind))| optional(name, number, kind)).collect();
    fields.push(typed(optional("optional_color", 16, FieldType::Enum), "Color"));
    message("Scalars", fields)
}

fn envelope() -> DescriptorProto {
    let mut envelope = message("Envelope", vec![
        typed(required("header", 1, FieldType::Message), ".fixtures.Header"),
        optional("payload", 2, FieldType::Bytes),
        repeated("tags", 3, FieldType::String),
        typed(repeated("meta", 4, FieldType::Message), "Meta"),
    ]);
    envelope.nested_type.push(message("Meta", vec![
        optional("key", 1, FieldType::String),
        optional("value", 2, FieldType::Int64),
    ]));
    envelope
}

fn defaults() -> DescriptorProto {
    message("Defaults", vec![
        with_default(optional("answer", 1, FieldType::Int32), "42"),
        with_default(optional("greeting", 2, FieldType::String), "hello"),
        with_default(optional("ratio", 3, FieldType::Double), "0.5"),
        with_default(optional("flag", 4, FieldType::Bool), "true"),
        with_default(optional("magic", 5, FieldType::Bytes), "\\001\\x02"),
        with_default(typed(optional("color", 6, FieldType::Enum), "Color"), "BLUE"),
        optional("plain", 7, FieldType::Sint64),
    ])
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto { name: Some(name.to_owned()), field, ..Default::default() }
}

fn enumeration(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name: Some((*name).to_owned()),
                number: Some(*number),
            })
            .collect(),
    }
}

fn field(name: &str, number: i32, label: Label, kind: FieldType) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(kind as i32),
        ..Default::default()
    }
}

fn optional(name: &str, number: i32, kind: FieldType) -> FieldDescriptorProto {
    field(name, number, Label::Optional, kind)
}

fn required(name: &str, number: i32, kind: FieldType) -> FieldDescriptorProto {
    field(name, number, Label::Required, kind)
}

fn repeated(name: &str, number: i32, kind: FieldType) -> FieldDescriptorProto {
    field(name, number, Label::Repeated, kind)
}

fn typed(field: FieldDescriptorProto, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto { type_name: Some(type_name.to_owned()), ..field }
}

fn with_default(field: FieldDescriptorProto, value: &str) -> FieldDescriptorProto {
    FieldDescriptorProto { default_value: Some(value.to_owned()), ..field }
}
