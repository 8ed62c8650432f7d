//! Type predicates and version information.

use scad_ir::ExprKind;

use super::{check_count, count_mismatch, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;
use crate::exec::Evaluator;
use crate::value::{Value, VectorBuilder};

/// Language version reported by `version()`.
pub const VERSION: (u16, u16, u16) = (2021, 1, 0);

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let enabled = BuiltinFlags::ENABLED;
    registry.register_function("is_undef", is_undef, enabled);
    registry.register_function("is_bool", |call| predicate(call, |v| matches!(v, Value::Bool(_))), enabled);
    registry.register_function(
        "is_num",
        |call| predicate(call, |v| matches!(v, Value::Number(n) if !n.is_nan())),
        enabled,
    );
    registry.register_function("is_string", |call| predicate(call, |v| matches!(v, Value::String(_))), enabled);
    registry.register_function("is_list", |call| predicate(call, |v| matches!(v, Value::Vector(_))), enabled);
    registry.register_function(
        "is_function",
        |call| predicate(call, |v| matches!(v, Value::Function(_))),
        enabled,
    );
    registry.register_function(
        "is_object",
        |call| predicate(call, |v| matches!(v, Value::Object(_))),
        BuiltinFlags::EXPERIMENTAL,
    );
    registry.register_function("version", version, enabled);
    registry.register_function("version_num", version_num, enabled);
}

/// `true` if the single argument satisfies `test`.
fn predicate(call: &BuiltinCall<'_>, test: fn(&Value) -> bool) -> EvalResult {
    let args = call.arguments()?;
    if !check_count(call, &args, 1) {
        return Ok(Value::undefined());
    }
    Ok(Value::Bool(args.value(0).is_some_and(test)))
}

/// `is_undef(x)` looks `x` up silently instead of warning when it is not
/// defined at all.
fn is_undef(call: &BuiltinCall<'_>) -> EvalResult {
    let [arg] = call.args else {
        count_mismatch(call, "1", call.args.len());
        return Ok(Value::undefined());
    };
    let Some(expr) = &arg.expr else {
        return Ok(Value::Bool(true));
    };
    let undefined = if let ExprKind::Lookup(name) = &expr.kind {
        match call.context.try_lookup_variable(name, call.session)? {
            Some(value) => value.is_undefined(),
            None => true,
        }
    } else {
        Evaluator::new(call.session)
            .eval(expr, call.context)?
            .is_undefined()
    };
    Ok(Value::Bool(undefined))
}

fn version(call: &BuiltinCall<'_>) -> EvalResult {
    let (year, month, _) = VERSION;
    let mut out = VectorBuilder::with_capacity(2, Some(call.session.accounting().clone()));
    out.push(Value::Number(f64::from(year)));
    out.push(Value::Number(f64::from(month)));
    Ok(Value::Vector(out.build()))
}

/// `year * 10000 + month * 100 + day` of the given `[year, month, day?]`
/// vector, or of the running version.
fn version_num(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let parts = if args.is_empty() {
        let (year, month, day) = VERSION;
        Some((f64::from(year), f64::from(month), f64::from(day)))
    } else {
        args.value(0).and_then(date_parts)
    };
    Ok(parts.map_or_else(Value::undefined, |(y, m, d)| {
        Value::Number(y * 10_000.0 + m * 100.0 + d)
    }))
}

fn date_parts(value: &Value) -> Option<(f64, f64, f64)> {
    let v = value.as_vector()?;
    if !(2..=3).contains(&v.len()) {
        return None;
    }
    let number = |i: usize| v.get(i).and_then(Value::as_finite_number);
    let day = if v.len() == 3 { number(2)? } else { 0.0 };
    Some((number(0)?, number(1)?, day))
}
