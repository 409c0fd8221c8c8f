//! Human-readable listing of a descriptor set.

use std::io::{self, Write};

use protolite_codegen::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FieldType, FileDescriptorSet,
    Label,
};

/// Write every file, message, enum and field in `set` to `out`.
///
/// ```text
/// file fixtures.proto (package fixtures)
///   enum Color
///     RED = 0
///   message Header
///     required uint64 id = 1
///     optional string topic = 2
/// ```
pub fn describe(set: &FileDescriptorSet, out: &mut impl Write) -> io::Result<()> {
    for file in &set.file {
        match file.package.as_deref() {
            Some(package) if !package.is_empty() => {
                writeln!(out, "file {} (package {package})", file.name())?;
            },
            _ => writeln!(out, "file {}", file.name())?,
        }
        for enumeration in &file.enum_type {
            describe_enum(enumeration, 1, out)?;
        }
        for message in &file.message_type {
            describe_message(message, 1, out)?;
        }
    }
    Ok(())
}

fn describe_message(message: &DescriptorProto, depth: usize, out: &mut impl Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(out, "{indent}message {}", message.name())?;
    for field in &message.field {
        writeln!(out, "{indent}  {}", field_line(field))?;
    }
    for enumeration in &message.enum_type {
        describe_enum(enumeration, depth + 1, out)?;
    }
    for nested in &message.nested_type {
        describe_message(nested, depth + 1, out)?;
    }
    Ok(())
}

fn describe_enum(enumeration: &EnumDescriptorProto, depth: usize, out: &mut impl Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(out, "{indent}enum {}", enumeration.name())?;
    for value in &enumeration.value {
        writeln!(out, "{indent}  {} = {}", value.name(), value.number.unwrap_or_default())?;
    }
    Ok(())
}

fn field_line(field: &FieldDescriptorProto) -> String {
    let label = match (field.label(), field.label) {
        (Some(label), _) => label.as_str().to_owned(),
        (None, Some(raw)) => format!("label({raw})"),
        (None, None) => Label::Optional.as_str().to_owned(),
    };

    let kind = match (field.field_type(), field.type_name.as_deref()) {
        (Some(FieldType::Message | FieldType::Enum) | None, Some(type_name)) => type_name.to_owned(),
        (Some(field_type), _) => field_type.as_str().to_owned(),
        (None, None) => field.r#type.map_or_else(|| "?".to_owned(), |raw| format!("type({raw})")),
    };

    let number = field.number.map_or_else(|| "?".to_owned(), |n| n.to_string());
    let mut line = format!("{label} {kind} {} = {number}", field.name());
    if let Some(default) = &field.default_value {
        line.push_str(&format!(" [default = {default}]"));
    }
    line
}
