//! Vector and string size builtins.

use super::{check_types, count_value, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;
use crate::value::{Value, ValueType, VectorBuilder};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    registry.register_function("len", len, BuiltinFlags::ENABLED);
    registry.register_function("concat", concat, BuiltinFlags::ENABLED);
}

/// Element count of a vector, grapheme count of a string.
fn len(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if args.len() == 1 {
        match args.value(0) {
            Some(Value::Vector(v)) => return Ok(count_value(v.len())),
            Some(Value::String(s)) => return Ok(count_value(s.grapheme_count())),
            _ => {}
        }
    }
    // Only reached on a mismatch, so this always warns.
    check_types(call, &args, &[ValueType::String]);
    Ok(Value::undefined())
}

/// Join the arguments into one vector. Vector arguments contribute their
/// elements, everything else contributes itself.
fn concat(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let mut out = VectorBuilder::with_capacity(args.len(), Some(call.session.accounting().clone()));
    for value in args.into_values() {
        match value {
            Value::Vector(v) => out.push(Value::EmbeddedVector(v.into_embedded())),
            other => out.push(other),
        }
    }
    Ok(Value::Vector(out.build()))
}
