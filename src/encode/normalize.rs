//! Canonicalization of host trees ahead of emission.
//!
//! Host values arrive through `serde`, which already maps records and
//! dictionaries to objects, iterables to arrays, date types to ISO-8601
//! strings, and non-finite floats to null. What can still slip through is
//! a negative-zero float; this pass folds it to integer zero so the tree
//! compares equal to its own decode.

use serde_json::Value;

pub fn normalize(value: Value) -> Value {
    match value {
        Value::Number(number) => {
            if let Some(float) = number.as_f64() {
                if float == 0.0 && float.is_sign_negative() {
                    return Value::Number(0.into());
                }
            }
            Value::Number(number)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}
