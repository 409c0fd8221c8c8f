//! proptest strategies over the generated fixture types.

use proptest::{collection::vec, num, option, prelude::*};

use crate::generated::{Numbers, Scalars, Tree};

/// Any `f64` except NaN, so generated values compare equal to themselves.
pub fn comparable_f64() -> impl Strategy<Value = f64> {
    num::f64::POSITIVE
        | num::f64::NEGATIVE
        | num::f64::NORMAL
        | num::f64::SUBNORMAL
        | num::f64::ZERO
        | num::f64::INFINITE
}

/// Any `f32` except NaN.
pub fn comparable_f32() -> impl Strategy<Value = f32> {
    num::f32::POSITIVE
        | num::f32::NEGATIVE
        | num::f32::NORMAL
        | num::f32::SUBNORMAL
        | num::f32::ZERO
        | num::f32::INFINITE
}

/// `Scalars` with each field independently present or absent.
pub fn scalars() -> impl Strategy<Value = Scalars> {
    let numeric = (
        option::of(comparable_f64()),
        option::of(comparable_f32()),
        option::of(any::<i32>()),
        option::of(any::<i64>()),
        option::of(any::<u32>()),
        option::of(any::<u64>()),
        option::of(any::<i32>()),
        option::of(any::<i64>()),
    );
    let rest = (
        option::of(any::<u32>()),
        option::of(any::<u64>()),
        option::of(any::<i32>()),
        option::of(any::<i64>()),
        option::of(any::<bool>()),
        option::of(".{0,32}"),
        option::of(vec(any::<u8>(), 0..64)),
        option::of(any::<i32>()),
    );

    (numeric, rest).prop_map(
        |(
            (double, float, int32, int64, uint32, uint64, sint32, sint64),
            (fixed32, fixed64, sfixed32, sfixed64, boolean, string, bytes, color),
        )| Scalars {
            optional_double: double,
            optional_float: float,
            optional_int32: int32,
            optional_int64: int64,
            optional_uint32: uint32,
            optional_uint64: uint64,
            optional_sint32: sint32,
            optional_sint64: sint64,
            optional_fixed32: fixed32,
            optional_fixed64: fixed64,
            optional_sfixed32: sfixed32,
            optional_sfixed64: sfixed64,
            optional_bool: boolean,
            optional_string: string,
            optional_bytes: bytes,
            optional_color: color,
        },
    )
}

/// `Numbers` with short repeated runs, including empty ones.
pub fn numbers() -> impl Strategy<Value = Numbers> {
    (
        vec(any::<i32>(), 0..16),
        vec(comparable_f64(), 0..8),
        vec(any::<i32>(), 0..8),
        vec(any::<i32>(), 0..8),
    )
        .prop_map(|(values, weights, offsets, colors)| Numbers { values, weights, offsets, colors })
}

/// Recursive `Tree` values a few levels deep.
pub fn tree() -> impl Strategy<Value = Tree> {
    let leaf = option::of(any::<i32>()).prop_map(|value| Tree { value, ..Tree::default() });
    leaf.prop_recursive(4, 32, 4, |inner| {
        (option::of(any::<i32>()), vec(inner.clone(), 0..4), option::of(inner))
            .prop_map(|(value, children, left)| Tree { value, children, left: left.map(Box::new) })
    })
}
