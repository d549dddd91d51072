//! Numeric-aware structural equality over JSON values.
//!
//! Two values are equivalent when they have the same kind and:
//! - numbers have the same numeric value (`1` and `1.0` are equivalent),
//! - strings, booleans and nulls are literally equal,
//! - arrays have the same length and pairwise-equivalent elements in order,
//! - objects have the same key set and equivalent values per key.
//!
//! Key order never affects equivalence. The walk uses an explicit work
//! stack, so arbitrarily deep input cannot exhaust the call stack.

use serde_json::{Number, Value};

/// Returns `true` if `a` and `b` are structurally equivalent.
pub fn equivalent(a: &Value, b: &Value) -> bool {
    let mut pending = vec![(a, b)];

    while let Some((a, b)) = pending.pop() {
        match (a, b) {
            (Value::Null, Value::Null) => {}
            (Value::Bool(x), Value::Bool(y)) if x == y => {}
            (Value::String(x), Value::String(y)) if x == y => {}
            (Value::Number(x), Value::Number(y)) if numbers_equivalent(x, y) => {}
            (Value::Array(xs), Value::Array(ys)) if xs.len() == ys.len() => {
                pending.extend(xs.iter().zip(ys.iter()));
            }
            (Value::Object(xs), Value::Object(ys)) if xs.len() == ys.len() => {
                for (key, x) in xs {
                    match ys.get(key) {
                        Some(y) => pending.push((x, y)),
                        None => return false,
                    }
                }
            }
            _ => return false,
        }
    }

    true
}

fn numbers_equivalent(a: &Number, b: &Number) -> bool {
    match (integer_value(a), integer_value(b)) {
        (Some(x), Some(y)) => x == y,
        (Some(x), None) => b.as_f64().is_some_and(|f| float_equals_integer(f, x)),
        (None, Some(y)) => a.as_f64().is_some_and(|f| float_equals_integer(f, y)),
        (None, None) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// The exact value of an integer-valued number, widened so `i64` and `u64`
/// share one domain.
fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Compares without rounding the integer through `f64`.
fn float_equals_integer(f: f64, i: i128) -> bool {
    // Every integer representable here has magnitude below 2^64.
    const BOUND: f64 = 18_446_744_073_709_551_616.0;
    f.is_finite() && f.fract() == 0.0 && f.abs() < BOUND && f as i128 == i
}
