//! Rust source emission from a [`SchemaPlan`].
//!
//! Output for one message:
//!
//! ```text
//! pub struct Outer { ..slots.. }      storage, one slot per field
//! impl Outer { ..accessors.. }        defaults for absent singular scalars
//! impl Message for Outer {
//!     merge_field                     match on field number, skip unknown
//!     check_required                  only when required fields exist
//!     encode_fields                   field-number order, packed numerics
//! }
//! ```
//!
//! Enums become modules of `i32` constants; fields holding an enum store the
//! raw number so unknown values survive a round trip.

use std::fmt::Write as _;

use protolite_wire::{Message, WireType};
use tracing::{debug, info};

use crate::{
    descriptor::FileDescriptorSet,
    error::Result,
    plan::{EnumPlan, FieldKind, FieldPlan, MessagePlan, SchemaPlan},
};

/// Generator knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Emit `encode_fields` bodies. When off, generated types decode only
    /// and encode to an empty message.
    pub emit_encode: bool,
    /// Path of the runtime crate as seen from the generated module
    pub runtime_crate: String,
    /// Add `Debug` to the derived traits
    pub derive_debug: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { emit_encode: true, runtime_crate: "protolite_wire".to_owned(), derive_debug: true }
    }
}

/// Generate Rust source for every message and enum in `set`.
pub fn generate(set: &FileDescriptorSet, config: &GeneratorConfig) -> Result<String> {
    let plan = SchemaPlan::build(set)?;
    let mut out = String::new();
    let emitter = Emitter { config, rt: &config.runtime_crate };

    writeln!(out, "// Generated by protolite. Do not edit.")?;
    for file in &plan.files {
        debug!(file = %file.name, messages = file.messages.len(), enums = file.enums.len(), "emitting file");
        writeln!(out)?;
        writeln!(out, "// source: {}", file.name)?;

        for enumeration in &file.enums {
            writeln!(out)?;
            emitter.enumeration(&mut out, enumeration)?;
        }
        for message in &file.messages {
            writeln!(out)?;
            emitter.message(&mut out, message)?;
        }
    }

    info!(files = plan.files.len(), bytes = out.len(), "generated source");
    Ok(out)
}

/// Decode a `FileDescriptorSet` from wire bytes, then [`generate`].
pub fn generate_from_bytes(bytes: &[u8], config: &GeneratorConfig) -> Result<String> {
    let set = FileDescriptorSet::decode(bytes)?;
    generate(&set, config)
}

struct Emitter<'c> {
    config: &'c GeneratorConfig,
    rt: &'c str,
}

impl Emitter<'_> {
    fn enumeration(&self, out: &mut String, plan: &EnumPlan) -> Result<()> {
        writeln!(out, "/// Values of `{}`.", plan.full_name)?;
        writeln!(out, "pub mod {} {{", plan.module)?;
        for (name, value) in &plan.values {
            writeln!(out, "    pub const {name}: i32 = {value};")?;
        }
        writeln!(out)?;
        writeln!(out, "    /// Name of a known value.")?;
        writeln!(out, "    pub fn name(value: i32) -> Option<&'static str> {{")?;
        writeln!(out, "        match value {{")?;
        let mut seen = Vec::with_capacity(plan.values.len());
        for (name, value) in &plan.values {
            // Aliases share a number; the first name wins.
            if seen.contains(value) {
                continue;
            }
            seen.push(*value);
            writeln!(out, "            {value} => Some({name:?}),")?;
        }
        writeln!(out, "            _ => None,")?;
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn message(&self, out: &mut String, plan: &MessagePlan) -> Result<()> {
        let derives = if self.config.derive_debug { "Debug, Clone, Default, PartialEq" } else { "Clone, Default, PartialEq" };

        writeln!(out, "/// `{}`", plan.full_name)?;
        writeln!(out, "#[derive({derives})]")?;
        writeln!(out, "pub struct {} {{", plan.rust_name)?;
        for field in &plan.fields {
            writeln!(out, "    /// {} = {}", field.name, field.number)?;
            writeln!(out, "    pub {}: {},", field.ident, field.storage_type())?;
        }
        writeln!(out, "}}")?;

        self.accessors(out, plan)?;

        writeln!(out)?;
        writeln!(out, "impl {}::Message for {} {{", self.rt, plan.rust_name)?;
        writeln!(out, "    const NAME: &'static str = {:?};", plan.full_name)?;
        writeln!(out)?;
        self.merge_field(out, plan)?;
        self.check_required(out, plan)?;
        writeln!(out)?;
        self.encode_fields(out, plan)?;
        writeln!(out, "}}")?;
        Ok(())
    }

    fn accessors(&self, out: &mut String, plan: &MessagePlan) -> Result<()> {
        let singular: Vec<&FieldPlan> = plan
            .fields
            .iter()
            .filter(|f| !f.is_repeated() && !matches!(f.kind, FieldKind::Message { .. }))
            .collect();
        if singular.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "impl {} {{", plan.rust_name)?;
        for (i, field) in singular.iter().enumerate() {
            let Some(spec) = field.kind.scalar() else { continue };
            if i > 0 {
                writeln!(out)?;
            }
            let ident = &field.ident;
            let (ret, body) = match (spec.is_copy, spec.rust_type, field.default.as_deref()) {
                (true, ty, Some(default)) => (ty, format!("self.{ident}.unwrap_or({default})")),
                (true, ty, None) => (ty, format!("self.{ident}.unwrap_or_default()")),
                (false, "String", Some(default)) => ("&str", format!("self.{ident}.as_deref().unwrap_or({default})")),
                (false, "String", None) => ("&str", format!("self.{ident}.as_deref().unwrap_or_default()")),
                (false, _, Some(default)) => ("&[u8]", format!("self.{ident}.as_deref().unwrap_or({default})")),
                (false, _, None) => ("&[u8]", format!("self.{ident}.as_deref().unwrap_or_default()")),
            };
            writeln!(out, "    /// Value of `{}`, or its default when absent.", field.name)?;
            writeln!(out, "    pub fn {ident}(&self) -> {ret} {{")?;
            writeln!(out, "        {body}")?;
            writeln!(out, "    }}")?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }

    fn merge_field(&self, out: &mut String, plan: &MessagePlan) -> Result<()> {
        let rt = self.rt;
        writeln!(out, "    fn merge_field(&mut self, dec: &mut {rt}::Decoder<'_>) -> {rt}::Result<()> {{")?;
        if plan.fields.is_empty() {
            writeln!(out, "        dec.skip_field()")?;
            writeln!(out, "    }}")?;
            return Ok(());
        }

        writeln!(out, "        match dec.field_number() {{")?;
        for field in &plan.fields {
            writeln!(out, "            {} => {},", field.number, self.read_expr(field))?;
        }
        writeln!(out, "            _ => dec.skip_field()?,")?;
        writeln!(out, "        }}")?;
        writeln!(out, "        Ok(())")?;
        writeln!(out, "    }}")?;
        Ok(())
    }

    /// Statement storing one occurrence of `field`.
    fn read_expr(&self, field: &FieldPlan) -> String {
        let rt = self.rt;
        let ident = &field.ident;

        let Some(spec) = field.kind.scalar() else {
            return if field.is_repeated() {
                format!("self.{ident}.push(dec.read_message()?)")
            } else {
                format!("dec.merge_message(&mut **self.{ident}.get_or_insert_with(Box::default))?")
            };
        };

        let value = match spec.rust_type {
            "String" => format!("dec.{}()?.to_owned()", spec.read),
            "Vec<u8>" => format!("dec.{}()?.to_vec()", spec.read),
            _ => format!("dec.{}()?", spec.read),
        };

        match (field.is_repeated(), field.packed_wire_type()) {
            (true, Some(packed)) => format!(
                "dec.read_repeated({rt}::WireType::{}, &mut self.{ident}, {rt}::Decoder::{})?",
                wire_type_variant(packed),
                spec.read
            ),
            (true, None) => format!("self.{ident}.push({value})"),
            (false, _) => format!("self.{ident} = Some({value})"),
        }
    }

    fn check_required(&self, out: &mut String, plan: &MessagePlan) -> Result<()> {
        let required: Vec<&FieldPlan> = plan.fields.iter().filter(|f| f.is_required()).collect();
        if required.is_empty() {
            return Ok(());
        }

        let rt = self.rt;
        writeln!(out)?;
        writeln!(out, "    fn check_required(&self) -> {rt}::Result<()> {{")?;
        for field in required {
            writeln!(out, "        if self.{}.is_none() {{", field.ident)?;
            writeln!(
                out,
                "            return Err({rt}::DecodeError::MissingRequiredField {{ message: Self::NAME, field: {:?} }});",
                field.name
            )?;
            writeln!(out, "        }}")?;
        }
        writeln!(out, "        Ok(())")?;
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn encode_fields(&self, out: &mut String, plan: &MessagePlan) -> Result<()> {
        let rt = self.rt;
        if !self.config.emit_encode || plan.fields.is_empty() {
            writeln!(out, "    fn encode_fields(&self, _enc: &mut {rt}::Encoder) {{}}")?;
            return Ok(());
        }

        writeln!(out, "    fn encode_fields(&self, enc: &mut {rt}::Encoder) {{")?;
        for field in plan.fields_by_number() {
            self.write_field(out, field)?;
        }
        writeln!(out, "    }}")?;
        Ok(())
    }

    fn write_field(&self, out: &mut String, field: &FieldPlan) -> Result<()> {
        let rt = self.rt;
        let ident = &field.ident;
        let number = field.number;

        let Some(spec) = field.kind.scalar() else {
            if field.is_repeated() {
                writeln!(out, "        for value in &self.{ident} {{")?;
                writeln!(out, "            enc.write_message_field({number}, value);")?;
            } else {
                writeln!(out, "        if let Some(value) = &self.{ident} {{")?;
                writeln!(out, "            enc.write_message_field({number}, &**value);")?;
            }
            writeln!(out, "        }}")?;
            return Ok(());
        };

        if field.packed_wire_type().is_some() {
            writeln!(out, "        enc.write_packed({number}, &self.{ident}, {rt}::Encoder::{});", spec.write_value)?;
            return Ok(());
        }

        if field.is_repeated() {
            writeln!(out, "        for value in &self.{ident} {{")?;
        } else if spec.is_copy {
            writeln!(out, "        if let Some(value) = self.{ident} {{")?;
        } else {
            writeln!(out, "        if let Some(value) = &self.{ident} {{")?;
        }
        writeln!(out, "            enc.{}({number}, value);", spec.write_field)?;
        writeln!(out, "        }}")?;
        Ok(())
    }
}

fn wire_type_variant(wire_type: WireType) -> &'static str {
    match wire_type {
        WireType::Varint => "Varint",
        WireType::Fixed64 => "Fixed64",
        WireType::LengthDelimited => "LengthDelimited",
        WireType::Fixed32 => "Fixed32",
    }
}
