//! Decode arbitrary bytes as generated fixture types.
//!
//! Any input that decodes must re-encode to bytes that decode to the same
//! value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use protolite_harness::{Envelope, Strict, Tree};
use protolite_wire::Message;

fn check<M: Message + PartialEq + std::fmt::Debug>(data: &[u8]) {
    if let Ok(msg) = M::decode(data) {
        let again = M::decode(&msg.encode_to_vec()).expect("re-encoded message must decode");
        assert_eq!(again, msg);
    }
}

fuzz_target!(|data: &[u8]| {
    check::<Envelope>(data);
    check::<Strict>(data);
    check::<Tree>(data);
});
