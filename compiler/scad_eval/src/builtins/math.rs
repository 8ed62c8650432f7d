//! Numeric builtins.

use super::{
    check_types, convert_mismatch, count_mismatch, BuiltinCall, BuiltinFlags, BuiltinRegistry,
};
use crate::errors::{EvalError, EvalResult};
use crate::value::{Value, ValueType, VectorBuilder, VectorType};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let enabled = BuiltinFlags::ENABLED;
    registry.register_function("abs", abs, enabled);
    registry.register_function("sign", sign, enabled);
    registry.register_function("sqrt", sqrt, enabled);
    registry.register_function("exp", exp, enabled);
    registry.register_function("ln", ln, enabled);
    registry.register_function("log", log, enabled);
    registry.register_function("pow", pow, enabled);
    registry.register_function("floor", floor, enabled);
    registry.register_function("ceil", ceil, enabled);
    registry.register_function("round", round, enabled);
    registry.register_function("min", min, enabled);
    registry.register_function("max", max, enabled);
    registry.register_function("norm", norm, enabled);
    registry.register_function("cross", cross, enabled);
    registry.register_function("lookup", lookup, enabled);
}

/// Apply `f` to a single number argument.
pub(super) fn unary(call: &BuiltinCall<'_>, f: impl Fn(f64) -> f64) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Number]) {
        return Ok(Value::undefined());
    }
    Ok(args.number(0).map_or_else(Value::undefined, |x| Value::Number(f(x))))
}

/// Apply `f` to two number arguments.
pub(super) fn binary(call: &BuiltinCall<'_>, f: impl Fn(f64, f64) -> f64) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Number, ValueType::Number]) {
        return Ok(Value::undefined());
    }
    match (args.number(0), args.number(1)) {
        (Some(a), Some(b)) => Ok(Value::Number(f(a, b))),
        _ => Ok(Value::undefined()),
    }
}

fn abs(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::abs)
}

fn sign(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, |x| {
        if x < 0.0 {
            -1.0
        } else if x > 0.0 {
            1.0
        } else {
            0.0
        }
    })
}

fn sqrt(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::sqrt)
}

fn exp(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::exp)
}

fn ln(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::ln)
}

fn floor(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::floor)
}

fn ceil(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::ceil)
}

fn round(call: &BuiltinCall<'_>) -> EvalResult {
    unary(call, f64::round)
}

fn pow(call: &BuiltinCall<'_>) -> EvalResult {
    binary(call, f64::powf)
}

/// `log(x)` is base 10; `log(b, x)` is base `b`.
fn log(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let (base, x) = if args.len() == 1 {
        if !check_types(call, &args, &[ValueType::Number]) {
            return Ok(Value::undefined());
        }
        (Some(10.0), args.number(0))
    } else {
        if !check_types(call, &args, &[ValueType::Number, ValueType::Number]) {
            return Ok(Value::undefined());
        }
        (args.number(0), args.number(1))
    };
    match (base, x) {
        (Some(base), Some(x)) => Ok(Value::Number(x.ln() / base.ln())),
        _ => Ok(Value::undefined()),
    }
}

/// Operands of `min`/`max`: either every argument, or the elements of a
/// single vector argument. All of them must be numbers.
fn min_max_operands(call: &BuiltinCall<'_>) -> Result<Option<Vec<f64>>, EvalError> {
    let args = call.arguments()?;
    if args.is_empty() {
        count_mismatch(call, "at least 1", 0);
        return Ok(None);
    }
    if args.len() == 1 {
        if let Some(elements) = args.value(0).and_then(Value::as_vector) {
            if elements.is_empty() {
                count_mismatch(call, "at least 1 vector element", 0);
                return Ok(None);
            }
            let mut out = Vec::with_capacity(elements.len());
            for (i, element) in elements.iter().enumerate() {
                let Some(n) = element.as_number() else {
                    convert_mismatch(call, &format!("vector element {i}"), ValueType::Number, element);
                    return Ok(None);
                };
                out.push(n);
            }
            return Ok(Some(out));
        }
    }
    let mut out = Vec::with_capacity(args.len());
    for (i, value) in args.values().enumerate() {
        let Some(n) = value.as_number() else {
            convert_mismatch(call, &format!("argument {i}"), ValueType::Number, value);
            return Ok(None);
        };
        out.push(n);
    }
    Ok(Some(out))
}

fn min(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(min_max_operands(call)?
        .and_then(|values| values.into_iter().reduce(f64::min))
        .map_or_else(Value::undefined, Value::Number))
}

fn max(call: &BuiltinCall<'_>) -> EvalResult {
    Ok(min_max_operands(call)?
        .and_then(|values| values.into_iter().reduce(f64::max))
        .map_or_else(Value::undefined, Value::Number))
}

/// Euclidean length of a vector of numbers.
fn norm(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Vector]) {
        return Ok(Value::undefined());
    }
    let Some(vector) = args.value(0).and_then(Value::as_vector) else {
        return Ok(Value::undefined());
    };
    let mut sum = 0.0;
    for element in vector.iter() {
        let Some(x) = element.as_number() else {
            call.warn("Incorrect arguments to norm()");
            return Ok(Value::undefined());
        };
        sum += x * x;
    }
    Ok(Value::Number(sum.sqrt()))
}

/// Cross product of two 3-vectors, or the scalar z of two 2-vectors.
fn cross(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Vector, ValueType::Vector]) {
        return Ok(Value::undefined());
    }
    let (Some(v0), Some(v1)) = (
        args.value(0).and_then(Value::as_vector),
        args.value(1).and_then(Value::as_vector),
    ) else {
        return Ok(Value::undefined());
    };
    let component =
        |v: &VectorType, i: usize| v.get(i).and_then(Value::as_number).unwrap_or(f64::NAN);

    if v0.len() == 2 && v1.len() == 2 {
        return Ok(Value::Number(
            component(v0, 0) * component(v1, 1) - component(v0, 1) * component(v1, 0),
        ));
    }
    if v0.len() != 3 || v1.len() != 3 {
        call.warn("Invalid vector size of parameter for cross()");
        return Ok(Value::undefined());
    }
    for i in 0..3 {
        let (Some(a), Some(b)) = (
            v0.get(i).and_then(Value::as_number),
            v1.get(i).and_then(Value::as_number),
        ) else {
            call.warn("Invalid value in parameter vector for cross()");
            return Ok(Value::undefined());
        };
        if a.is_nan() || b.is_nan() {
            call.warn("Invalid value (NaN) in parameter vector for cross()");
            return Ok(Value::undefined());
        }
        if a.is_infinite() || b.is_infinite() {
            call.warn("Invalid value (INF) in parameter vector for cross()");
            return Ok(Value::undefined());
        }
    }
    let (x0, y0, z0) = (component(v0, 0), component(v0, 1), component(v0, 2));
    let (x1, y1, z1) = (component(v1, 0), component(v1, 1), component(v1, 2));

    let mut out = VectorBuilder::with_capacity(3, Some(call.session.accounting().clone()));
    out.push(Value::Number(y0 * z1 - z0 * y1));
    out.push(Value::Number(z0 * x1 - x0 * z1));
    out.push(Value::Number(x0 * y1 - y0 * x1));
    Ok(Value::Vector(out.build()))
}

/// `[x, y]` with two finite numbers.
fn vec2(value: &Value) -> Option<(f64, f64)> {
    let v = value.as_vector()?;
    if v.len() != 2 {
        return None;
    }
    let x = v.get(0)?.as_finite_number()?;
    let y = v.get(1)?.as_finite_number()?;
    Some((x, y))
}

/// Linear interpolation in a table of `[key, value]` pairs.
fn lookup(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Number, ValueType::Vector]) {
        return Ok(Value::undefined());
    }
    let (Some(p), Some(table)) = (args.number(0), args.value(1).and_then(Value::as_vector)) else {
        return Ok(Value::undefined());
    };
    if !p.is_finite() {
        if let Some(first) = args.value(0) {
            call.warn(format!(
                "lookup({}, ...) first argument is not a number",
                first.to_echo_string()
            ));
        }
        return Ok(Value::undefined());
    }

    let mut entries = table.iter();
    let Some((mut low_p, mut low_v)) = entries.next().and_then(vec2) else {
        return Ok(Value::undefined());
    };
    let (mut high_p, mut high_v) = (low_p, low_v);
    for (this_p, this_v) in entries.filter_map(vec2) {
        if this_p <= p && (this_p > low_p || low_p > p) {
            low_p = this_p;
            low_v = this_v;
        }
        if this_p >= p && (this_p < high_p || high_p < p) {
            high_p = this_p;
            high_v = this_v;
        }
    }
    if p <= low_p {
        return Ok(Value::Number(high_v));
    }
    if p >= high_p {
        return Ok(Value::Number(low_v));
    }
    let f = (p - low_p) / (high_p - low_p);
    Ok(Value::Number(high_v * f + low_v * (1.0 - f)))
}
