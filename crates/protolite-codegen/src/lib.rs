//! Descriptor-set model and code generator.
//!
//! Reads a compiled schema (a `FileDescriptorSet` in wire format) and emits
//! Rust source for every message it describes. The emitted types implement
//! [`protolite_wire::Message`], so they decode and encode through the same
//! runtime that decodes the descriptor set itself.
//!
//! # Pipeline
//!
//! ```text
//! bytes ─▶ descriptor (hand-written bootstrap) ─▶ plan (layouts) ─▶ generator (source text)
//! ```
//!
//! # Components
//!
//! - [`descriptor`]: schema model with hand-written field dispatch
//! - [`plan`]: type resolution and per-field layout decisions
//! - [`generator`]: Rust source emission
//! - [`error`]: generation error types

pub mod descriptor;
pub mod error;
pub mod generator;
pub mod plan;

pub use descriptor::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldType, FileDescriptorProto, FileDescriptorSet, Label,
};
pub use error::{GenerateError, Result};
pub use generator::{GeneratorConfig, generate, generate_from_bytes};
pub use plan::{FieldKind, FieldPlan, MessagePlan, SchemaPlan};
