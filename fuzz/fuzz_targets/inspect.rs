//! Schema-less inspection of arbitrary bytes.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(fields) = protolite_wire::inspect(data) {
        let _ = protolite_wire::render(&fields);
    }
});
