//! String builtins.

use std::fmt::Write;

use super::{check_types, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;
use crate::value::{Value, ValueType};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    registry.register_function("str", concat_text, BuiltinFlags::ENABLED);
    registry.register_function("chr", chr, BuiltinFlags::ENABLED);
    registry.register_function("ord", ord, BuiltinFlags::ENABLED);
}

/// Concatenation of the plain renderings of every argument.
fn concat_text(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let mut out = String::new();
    for value in args.values() {
        let _ = write!(out, "{value}");
    }
    Ok(Value::string(out))
}

/// String of the code points given as numbers, vectors or ranges.
fn chr(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let mut out = String::new();
    for value in args.values() {
        push_chars(call, value, &mut out);
    }
    Ok(Value::string(out))
}

fn push_chars(call: &BuiltinCall<'_>, value: &Value, out: &mut String) {
    match value {
        Value::Number(n) => {
            if let Some(c) = code_point(*n) {
                out.push(c);
            }
        }
        Value::Vector(v) => {
            for element in v.iter() {
                push_chars(call, element, out);
            }
        }
        Value::Range(range) => {
            let steps = range.num_values();
            if steps >= call.session.config().range_limit {
                call.warn(format!(
                    "Bad range parameter in for statement: too many elements ({steps})"
                ));
                return;
            }
            for n in range.iter() {
                if let Some(c) = code_point(n) {
                    out.push(c);
                }
            }
        }
        _ => {}
    }
}

/// Valid, non-zero Unicode scalar value truncated from `n`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn code_point(n: f64) -> Option<char> {
    if n.is_nan() || n < 1.0 || n > f64::from(u32::MAX) {
        return None;
    }
    char::from_u32(n as u32)
}

/// Code point of the first character of a string.
fn ord(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::String]) {
        return Ok(Value::undefined());
    }
    let first = args.value(0).and_then(Value::as_str).and_then(|s| s.chars().next());
    Ok(first.map_or_else(Value::undefined, |c| Value::Number(f64::from(u32::from(c)))))
}
