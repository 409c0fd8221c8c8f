//! Arbitrary bytes through descriptor decoding and code generation.
//!
//! Generation may reject the input but must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use protolite_codegen::{GeneratorConfig, generate_from_bytes};

fuzz_target!(|data: &[u8]| {
    let _ = generate_from_bytes(data, &GeneratorConfig::default());
});
