//! Runs the generator over the fixture schema so the harness compiles real
//! generated code.

use std::{env, fs, path::PathBuf};

use protolite_codegen::GeneratorConfig;

#[allow(dead_code)]
#[path = "src/schema.rs"]
mod schema;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/schema.rs");

    let source = protolite_codegen::generate(&schema::fixture_set(), &GeneratorConfig::default())?;
    let out = PathBuf::from(env::var("OUT_DIR")?).join("fixtures.rs");
    fs::write(out, source)?;
    Ok(())
}
