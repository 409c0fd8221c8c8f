//! Shared test fixtures for protolite.
//!
//! The fixture schema lives in [`schema`]. The build script runs the code
//! generator over it and the result is compiled here as [`generated`], so
//! every test that uses these types also checks that generated source builds
//! and links against the runtime.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod schema;
pub mod strategy;

/// Types generated from [`schema::fixture_set`].
#[allow(missing_docs, clippy::all, clippy::pedantic)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/fixtures.rs"));
}

pub use generated::{
    Defaults, Empty, Envelope, EnvelopeMeta, Header, Lenient, Numbers, Scalars, Strict, Tree,
    Wrapper, color,
};
use protolite_wire::Message;

/// Wire encoding of [`schema::fixture_set`], as `protoc --descriptor_set_out`
/// would write it.
pub fn fixture_set_bytes() -> Vec<u8> {
    schema::fixture_set().encode_to_vec()
}
