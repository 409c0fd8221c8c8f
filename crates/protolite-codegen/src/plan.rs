//! Layout planning: from descriptors to per-field storage and dispatch
//! decisions.
//!
//! Planning resolves every `type_name`, rejects constructs the generator does
//! not support, and fixes for each field its Rust storage type, presence
//! representation and the Decoder/Encoder calls used for it. The generator
//! then only has to print what the plan says.
//!
//! # Naming
//!
//! Nested declarations are flattened: `pkg.Outer.Inner` becomes
//! `OuterInner`. Field names become snake_case identifiers, with Rust
//! keywords escaped as raw identifiers.

use std::collections::HashMap;

use protolite_wire::{WireType, wire_type::MAX_FIELD_NUMBER};
use tracing::trace;

use crate::{
    descriptor::{
        DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FieldType,
        FileDescriptorSet, Label,
    },
    error::{GenerateError, Result},
};

/// Fixed mapping from a scalar kind to its Rust type and wire calls.
#[derive(Debug, PartialEq, Eq)]
pub struct ScalarSpec {
    /// Rust value type
    pub rust_type: &'static str,
    /// `Decoder` method reading one value
    pub read: &'static str,
    /// `Encoder` method writing one untagged value (packed elements)
    pub write_value: &'static str,
    /// `Encoder` method writing one tagged field
    pub write_field: &'static str,
    /// Element wire type inside a packed run; `None` when not packable
    pub packed: Option<WireType>,
    /// `Copy` types are returned by value from accessors
    pub is_copy: bool,
}

macro_rules! scalar {
    ($ty:literal, $read:literal, $value:literal, $field:literal, $packed:expr, $copy:literal) => {
        ScalarSpec {
            rust_type: $ty,
            read: $read,
            write_value: $value,
            write_field: $field,
            packed: $packed,
            is_copy: $copy,
        }
    };
}

const DOUBLE: ScalarSpec = scalar!("f64", "read_double", "write_fixed::<f64>", "write_double_field", Some(WireType::Fixed64), true);
const FLOAT: ScalarSpec = scalar!("f32", "read_float", "write_fixed::<f32>", "write_float_field", Some(WireType::Fixed32), true);
const INT64: ScalarSpec = scalar!("i64", "read_int64", "write_int64", "write_int64_field", Some(WireType::Varint), true);
const UINT64: ScalarSpec = scalar!("u64", "read_uint64", "write_uint64", "write_uint64_field", Some(WireType::Varint), true);
const INT32: ScalarSpec = scalar!("i32", "read_int32", "write_int32", "write_int32_field", Some(WireType::Varint), true);
const FIXED64: ScalarSpec = scalar!("u64", "read_fixed64_value", "write_fixed::<u64>", "write_fixed_field", Some(WireType::Fixed64), true);
const FIXED32: ScalarSpec = scalar!("u32", "read_fixed32_value", "write_fixed::<u32>", "write_fixed_field", Some(WireType::Fixed32), true);
const BOOL: ScalarSpec = scalar!("bool", "read_bool", "write_bool", "write_bool_field", Some(WireType::Varint), true);
const STRING: ScalarSpec = scalar!("String", "read_string", "", "write_string_field", None, false);
const BYTES: ScalarSpec = scalar!("Vec<u8>", "read_bytes", "", "write_bytes_field", None, false);
const UINT32: ScalarSpec = scalar!("u32", "read_uint32", "write_uint32", "write_uint32_field", Some(WireType::Varint), true);
const ENUM: ScalarSpec = scalar!("i32", "read_enum", "write_enum", "write_enum_field", Some(WireType::Varint), true);
const SFIXED32: ScalarSpec = scalar!("i32", "read_sfixed32", "write_fixed::<i32>", "write_fixed_field", Some(WireType::Fixed32), true);
const SFIXED64: ScalarSpec = scalar!("i64", "read_sfixed64", "write_fixed::<i64>", "write_fixed_field", Some(WireType::Fixed64), true);
const SINT32: ScalarSpec = scalar!("i32", "read_sint32", "write_sint32", "write_sint32_field", Some(WireType::Varint), true);
const SINT64: ScalarSpec = scalar!("i64", "read_sint64", "write_sint64", "write_sint64_field", Some(WireType::Varint), true);

impl ScalarSpec {
    /// Table entry for `field_type`; `None` for message and group.
    pub fn for_type(field_type: FieldType) -> Option<&'static Self> {
        let spec = match field_type {
            FieldType::Double => &DOUBLE,
            FieldType::Float => &FLOAT,
            FieldType::Int64 => &INT64,
            FieldType::Uint64 => &UINT64,
            FieldType::Int32 => &INT32,
            FieldType::Fixed64 => &FIXED64,
            FieldType::Fixed32 => &FIXED32,
            FieldType::Bool => &BOOL,
            FieldType::String => &STRING,
            FieldType::Bytes => &BYTES,
            FieldType::Uint32 => &UINT32,
            FieldType::Enum => &ENUM,
            FieldType::Sfixed32 => &SFIXED32,
            FieldType::Sfixed64 => &SFIXED64,
            FieldType::Sint32 => &SINT32,
            FieldType::Sint64 => &SINT64,
            FieldType::Message | FieldType::Group => return None,
        };
        Some(spec)
    }
}

/// What a field stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Numeric, bool, string or bytes
    Scalar(FieldType),
    /// Open enum stored as `i32`
    Enum {
        /// Generated constants holder
        rust_name: String,
    },
    /// Embedded message
    Message {
        /// Generated struct
        rust_name: String,
    },
}

impl FieldKind {
    /// Scalar table entry; `None` for messages.
    pub fn scalar(&self) -> Option<&'static ScalarSpec> {
        match self {
            Self::Scalar(field_type) => ScalarSpec::for_type(*field_type),
            Self::Enum { .. } => Some(&ENUM),
            Self::Message { .. } => None,
        }
    }

    /// Rust type of one value.
    pub fn value_type(&self) -> &str {
        match self {
            Self::Message { rust_name } => rust_name,
            _ => self.scalar().map_or("()", |spec| spec.rust_type),
        }
    }
}

/// Planned layout of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPlan {
    /// Name in the schema
    pub name: String,
    /// Rust identifier (possibly raw)
    pub ident: String,
    /// Field number
    pub number: u32,
    /// Cardinality
    pub label: Label,
    /// Stored kind
    pub kind: FieldKind,
    /// Rust expression for the schema default, if one is declared
    pub default: Option<String>,
}

impl FieldPlan {
    /// Repeated fields use emptiness as absence and have no presence slot.
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Required fields are checked after decode.
    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    /// Element wire type for packed encoding, for repeated numeric fields.
    pub fn packed_wire_type(&self) -> Option<WireType> {
        if !self.is_repeated() {
            return None;
        }
        self.kind.scalar().and_then(|spec| spec.packed)
    }

    /// Rust type of the struct slot.
    pub fn storage_type(&self) -> String {
        let value = self.kind.value_type();
        match (&self.kind, self.label) {
            (_, Label::Repeated) => format!("Vec<{value}>"),
            (FieldKind::Message { .. }, _) => format!("Option<Box<{value}>>"),
            _ => format!("Option<{value}>"),
        }
    }
}

/// Planned layout of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePlan {
    /// Fully qualified schema name without the leading dot
    pub full_name: String,
    /// Generated struct name
    pub rust_name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldPlan>,
}

impl MessagePlan {
    /// Fields sorted by number, the order they are encoded in.
    pub fn fields_by_number(&self) -> Vec<&FieldPlan> {
        let mut fields: Vec<&FieldPlan> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.number);
        fields
    }
}

/// Planned enum: a set of named `i32` constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumPlan {
    /// Fully qualified schema name without the leading dot
    pub full_name: String,
    /// Flattened CamelCase name
    pub rust_name: String,
    /// Generated module holding the constants
    pub module: String,
    /// (constant name, value) in declaration order
    pub values: Vec<(String, i32)>,
}

/// Planned output for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    /// File name from the descriptor
    pub name: String,
    /// Messages, nested ones flattened after their parent
    pub messages: Vec<MessagePlan>,
    /// Enums, nested ones flattened
    pub enums: Vec<EnumPlan>,
}

/// Planned output for a whole descriptor set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPlan {
    /// One entry per file
    pub files: Vec<FilePlan>,
}

impl SchemaPlan {
    /// Plan every message and enum in `set`.
    pub fn build(set: &FileDescriptorSet) -> Result<Self> {
        let index = TypeIndex::build(set)?;
        let mut files = Vec::with_capacity(set.file.len());

        for file in &set.file {
            let scope = Scope::root(file.package());
            let mut plan = FilePlan {
                name: file.name().to_owned(),
                messages: Vec::new(),
                enums: Vec::new(),
            };
            for enumeration in &file.enum_type {
                plan.enums.push(plan_enum(&scope, enumeration));
            }
            for message in &file.message_type {
                plan_message(&index, &scope, message, &mut plan)?;
            }
            files.push(plan);
        }

        Ok(Self { files })
    }

    /// All message plans across files.
    pub fn messages(&self) -> impl Iterator<Item = &MessagePlan> {
        self.files.iter().flat_map(|file| file.messages.iter())
    }
}

/// Naming scope while walking nested declarations.
#[derive(Debug, Clone)]
struct Scope {
    /// `.pkg.Outer` (leading dot, empty for the root of an unnamed package)
    full_name: String,
    /// `Outer` prefix for flattened Rust names
    rust_prefix: String,
}

impl Scope {
    fn root(package: &str) -> Self {
        let full_name = if package.is_empty() { String::new() } else { format!(".{package}") };
        Self { full_name, rust_prefix: String::new() }
    }

    fn child(&self, name: &str) -> Self {
        Self {
            full_name: format!("{}.{name}", self.full_name),
            rust_prefix: format!("{}{}", self.rust_prefix, rust_type_name(name)),
        }
    }

    fn display_name(&self) -> &str {
        self.full_name.trim_start_matches('.')
    }
}

#[derive(Debug, Clone)]
enum IndexedType {
    Message { rust_name: String },
    Enum { rust_name: String, values: Vec<(String, i32)> },
}

/// Every declared type, keyed by fully qualified name with leading dot.
///
/// Generated items share one flat namespace, so each flattened Rust name may
/// be claimed by a single message and a single enum.
#[derive(Debug, Default)]
struct TypeIndex {
    types: HashMap<String, IndexedType>,
    /// Rust struct name to the schema message that owns it
    structs: HashMap<String, String>,
    /// Rust module name to the schema enum that owns it
    modules: HashMap<String, String>,
}

impl TypeIndex {
    fn build(set: &FileDescriptorSet) -> Result<Self> {
        let mut index = Self::default();
        for file in &set.file {
            let scope = Scope::root(file.package());
            index.add_enums(&scope, &file.enum_type)?;
            for message in &file.message_type {
                index.add_message(&scope, message)?;
            }
        }
        Ok(index)
    }

    fn add_message(&mut self, parent: &Scope, message: &DescriptorProto) -> Result<()> {
        let scope = parent.child(message.name());
        claim(&mut self.structs, scope.rust_prefix.clone(), &scope)?;
        self.types.insert(
            scope.full_name.clone(),
            IndexedType::Message { rust_name: scope.rust_prefix.clone() },
        );
        self.add_enums(&scope, &message.enum_type)?;
        for nested in &message.nested_type {
            self.add_message(&scope, nested)?;
        }
        Ok(())
    }

    fn add_enums(&mut self, parent: &Scope, enums: &[EnumDescriptorProto]) -> Result<()> {
        for enumeration in enums {
            let scope = parent.child(enumeration.name());
            claim(&mut self.modules, rust_module_name(&scope.rust_prefix), &scope)?;
            let values = enum_values(enumeration);
            self.types.insert(
                scope.full_name.clone(),
                IndexedType::Enum { rust_name: scope.rust_prefix.clone(), values },
            );
        }
        Ok(())
    }

    /// Resolve `type_name` as seen from inside `scope`.
    ///
    /// Fully qualified names (leading dot) are looked up directly. Relative
    /// names are tried in `scope`, then each enclosing scope outwards.
    fn resolve(&self, scope: &Scope, type_name: &str) -> Option<&IndexedType> {
        if type_name.starts_with('.') {
            return self.types.get(type_name);
        }

        let mut current = scope.full_name.as_str();
        loop {
            let candidate = format!("{current}.{type_name}");
            if let Some(found) = self.types.get(&candidate) {
                return Some(found);
            }
            match current.rfind('.') {
                Some(cut) => current = &current[..cut],
                None => return None,
            }
        }
    }
}

/// Record `scope` as the owner of `rust_name`, failing if another type has it.
fn claim(owners: &mut HashMap<String, String>, rust_name: String, scope: &Scope) -> Result<()> {
    let full_name = scope.display_name();
    if let Some(first) = owners.get(&rust_name) {
        return Err(GenerateError::NameCollision {
            rust_name,
            first: first.clone(),
            second: full_name.to_owned(),
        });
    }
    owners.insert(rust_name, full_name.to_owned());
    Ok(())
}

fn enum_values(enumeration: &EnumDescriptorProto) -> Vec<(String, i32)> {
    enumeration
        .value
        .iter()
        .map(|value| (value.name().to_owned(), value.number.unwrap_or_default()))
        .collect()
}

fn plan_enum(parent: &Scope, enumeration: &EnumDescriptorProto) -> EnumPlan {
    let scope = parent.child(enumeration.name());
    EnumPlan {
        full_name: scope.display_name().to_owned(),
        module: rust_module_name(&scope.rust_prefix),
        rust_name: scope.rust_prefix.clone(),
        values: enum_values(enumeration),
    }
}

fn plan_message(
    index: &TypeIndex,
    parent: &Scope,
    message: &DescriptorProto,
    out: &mut FilePlan,
) -> Result<()> {
    let scope = parent.child(message.name());
    let full_name = scope.display_name().to_owned();
    trace!(message = %full_name, fields = message.field.len(), "planning message");

    let fields = message
        .field
        .iter()
        .map(|field| plan_field(index, &scope, &full_name, field))
        .collect::<Result<Vec<_>>>()?;

    out.messages.push(MessagePlan { full_name, rust_name: scope.rust_prefix.clone(), fields });

    for enumeration in &message.enum_type {
        out.enums.push(plan_enum(&scope, enumeration));
    }
    for nested in &message.nested_type {
        plan_message(index, &scope, nested, out)?;
    }
    Ok(())
}

fn plan_field(
    index: &TypeIndex,
    scope: &Scope,
    message: &str,
    field: &FieldDescriptorProto,
) -> Result<FieldPlan> {
    let name = field.name().to_owned();

    let label = match field.label {
        None => {
            return Err(GenerateError::MissingLabel { message: message.to_owned(), field: name });
        },
        Some(raw) => Label::from_i32(raw).ok_or_else(|| GenerateError::UnknownLabel {
            message: message.to_owned(),
            field: name.clone(),
            value: raw,
        })?,
    };

    let number = field
        .number
        .filter(|n| *n > 0 && n.unsigned_abs() <= MAX_FIELD_NUMBER)
        .ok_or_else(|| GenerateError::InvalidFieldNumber {
            message: message.to_owned(),
            field: name.clone(),
            value: field.number.unwrap_or_default(),
        })? as u32;

    let field_type = match field.r#type {
        Some(raw) => Some(FieldType::from_i32(raw).ok_or_else(|| {
            GenerateError::UnknownFieldType { message: message.to_owned(), field: name.clone(), value: raw }
        })?),
        None => None,
    };

    let (kind, enum_values) = match field_type {
        Some(FieldType::Group) => {
            return Err(GenerateError::UnsupportedSchemaConstruct {
                message: message.to_owned(),
                field: name,
                construct: "group",
            });
        },
        Some(FieldType::Message | FieldType::Enum) | None => {
            let Some(type_name) = field.type_name.as_deref() else {
                return Err(GenerateError::MissingFieldType { message: message.to_owned(), field: name });
            };
            let resolved = index.resolve(scope, type_name).ok_or_else(|| {
                GenerateError::UnresolvedType {
                    message: message.to_owned(),
                    field: name.clone(),
                    type_name: type_name.to_owned(),
                }
            })?;
            match (resolved, field_type) {
                (IndexedType::Message { rust_name }, None | Some(FieldType::Message)) => {
                    (FieldKind::Message { rust_name: rust_name.clone() }, None)
                },
                (IndexedType::Enum { rust_name, values }, None | Some(FieldType::Enum)) => {
                    (FieldKind::Enum { rust_name: rust_name.clone() }, Some(values))
                },
                _ => {
                    return Err(GenerateError::UnresolvedType {
                        message: message.to_owned(),
                        field: name,
                        type_name: type_name.to_owned(),
                    });
                },
            }
        },
        Some(scalar) => (FieldKind::Scalar(scalar), None),
    };

    let default = match field.default_value.as_deref() {
        Some(raw) if label != Label::Repeated => {
            Some(default_expr(&kind, raw, enum_values.map(Vec::as_slice)).ok_or_else(|| {
                GenerateError::InvalidDefault {
                    message: message.to_owned(),
                    field: name.clone(),
                    value: raw.to_owned(),
                }
            })?)
        },
        _ => None,
    };

    Ok(FieldPlan { ident: rust_field_ident(&name), name, number, label, kind, default })
}

/// Rust expression for a textual default, or `None` if it does not parse.
fn default_expr(kind: &FieldKind, raw: &str, enum_values: Option<&[(String, i32)]>) -> Option<String> {
    let field_type = match kind {
        FieldKind::Scalar(field_type) => *field_type,
        FieldKind::Enum { .. } => {
            let number = enum_values?.iter().find(|(name, _)| name == raw)?.1;
            return Some(number.to_string());
        },
        FieldKind::Message { .. } => return None,
    };

    let expr = match field_type {
        FieldType::Double => float_literal::<f64>(raw, "f64")?,
        FieldType::Float => float_literal::<f32>(raw, "f32")?,
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => raw.parse::<i32>().ok()?.to_string(),
        FieldType::Int64 | FieldType::Sint64 | FieldType::Sfixed64 => raw.parse::<i64>().ok()?.to_string(),
        FieldType::Uint32 | FieldType::Fixed32 => raw.parse::<u32>().ok()?.to_string(),
        FieldType::Uint64 | FieldType::Fixed64 => raw.parse::<u64>().ok()?.to_string(),
        FieldType::Bool => match raw {
            "true" | "false" => raw.to_owned(),
            _ => return None,
        },
        FieldType::String => format!("{raw:?}"),
        FieldType::Bytes => format!("&{:?}", unescape_bytes(raw)?),
        FieldType::Message | FieldType::Enum | FieldType::Group => return None,
    };
    Some(expr)
}

/// Parsed at the field's own width; values that overflow it are rejected.
fn float_literal<F>(raw: &str, ty: &str) -> Option<String>
where
    F: std::str::FromStr + std::fmt::Debug + Into<f64> + Copy,
{
    match raw {
        "inf" => return Some(format!("{ty}::INFINITY")),
        "-inf" => return Some(format!("{ty}::NEG_INFINITY")),
        "nan" => return Some(format!("{ty}::NAN")),
        _ => {},
    }
    let value: F = raw.parse().ok()?;
    if !value.into().is_finite() {
        return None;
    }
    Some(format!("{value:?}_{ty}"))
}

/// Undo the C-style escaping `protoc` applies to `bytes` defaults.
fn unescape_bytes(raw: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.bytes().peekable();

    while let Some(byte) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        let escaped = bytes.next()?;
        let value = match escaped {
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'"' | b'\'' | b'\\' | b'?' => escaped,
            b'0'..=b'7' => {
                let mut value = u32::from(escaped - b'0');
                for _ in 0..2 {
                    match bytes.peek() {
                        Some(digit @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(digit - b'0');
                            bytes.next();
                        },
                        _ => break,
                    }
                }
                u8::try_from(value).ok()?
            },
            b'x' => {
                let mut value = 0u32;
                let mut digits = 0;
                while let Some(digit) = bytes.peek().and_then(|d| char::from(*d).to_digit(16)) {
                    value = value * 16 + digit;
                    digits += 1;
                    bytes.next();
                    if digits == 2 {
                        break;
                    }
                }
                if digits == 0 {
                    return None;
                }
                value as u8
            },
            _ => return None,
        };
        out.push(value);
    }

    Some(out)
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// snake_case identifier for a schema field name.
pub fn rust_field_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 && !ident.ends_with('_') {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
        } else {
            ident.push(c);
        }
    }

    escape_keyword(ident)
}

/// snake_case module name for a flattened CamelCase type name.
pub fn rust_module_name(type_name: &str) -> String {
    let chars: Vec<char> = type_name.chars().collect();
    let mut out = String::with_capacity(type_name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    escape_keyword(out)
}

fn escape_keyword(ident: String) -> String {
    match ident.as_str() {
        "self" | "super" | "crate" | "_" => format!("{ident}_"),
        keyword if KEYWORDS.contains(&keyword) => format!("r#{ident}"),
        _ => ident,
    }
}

/// CamelCase type name for a schema message or enum name.
pub fn rust_type_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    if out == "Self" {
        out.push('_');
    }
    out
}
