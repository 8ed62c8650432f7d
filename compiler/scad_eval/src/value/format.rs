//! Text rendering of values.
//!
//! `to_string()` prints top-level strings raw; strings nested in vectors
//! and objects are quoted. `echo` quotes top-level strings too.

use std::fmt;

use scad_ir::ast::write_quoted;
use scad_ir::format_number;

use super::{ObjectType, RangeType, Value, VectorType};

/// `[begin : step : end]`
pub(super) struct DisplayRange<'a>(pub &'a RangeType);

impl fmt::Display for DisplayRange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} : {} : {}]",
            format_number(self.0.begin()),
            format_number(self.0.step()),
            format_number(self.0.end())
        )
    }
}

fn write_nested(f: &mut impl fmt::Write, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write_quoted(f, s.as_str()),
        other => write_value(f, other),
    }
}

fn write_vector(f: &mut impl fmt::Write, vector: &VectorType) -> fmt::Result {
    f.write_char('[')?;
    for (i, item) in vector.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        scad_stack::ensure_sufficient_stack(|| write_nested(f, item))?;
    }
    f.write_char(']')
}

fn write_object(f: &mut impl fmt::Write, object: &ObjectType) -> fmt::Result {
    f.write_str("{ ")?;
    for (key, value) in object.iter() {
        write!(f, "{key} = ")?;
        scad_stack::ensure_sufficient_stack(|| write_nested(f, value))?;
        f.write_str("; ")?;
    }
    f.write_char('}')
}

fn write_value(f: &mut impl fmt::Write, value: &Value) -> fmt::Result {
    match value {
        Value::Undefined(_) => f.write_str("undef"),
        Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        Value::Number(n) => f.write_str(&format_number(*n)),
        Value::String(s) => f.write_str(s.as_str()),
        Value::Vector(v) => write_vector(f, v),
        Value::EmbeddedVector(v) => write_vector(f, &v.clone().into_vector()),
        Value::Range(r) => write!(f, "{}", DisplayRange(r)),
        Value::Function(func) => write!(f, "{}", **func),
        Value::Object(o) => write_object(f, o),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self)
    }
}

impl Value {
    /// Rendering used by `echo`: like `to_string()` but quotes strings.
    pub fn to_echo_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_nested(&mut out, self);
        out
    }
}
