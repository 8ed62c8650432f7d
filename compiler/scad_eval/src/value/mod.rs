//! Runtime values.
//!
//! [`Value`] is a closed tagged union. Containers (vectors, objects,
//! ranges, functions) are reference counted and immutable once built, so
//! `clone()` is cheap and never aliases anything that can change. Cloning
//! is still explicit at every call site: sharing vs. copying is visible.
//!
//! Every operator is total. A type mismatch yields `undef` with a reason
//! (see [`UndefType`]) instead of an error.

mod compare;
mod format;
mod function;
mod object;
mod ops;
mod range;
mod string;
mod undef;
mod vector;

use std::fmt;
use std::rc::Rc;

pub use function::{FunctionPtr, FunctionType};
pub use object::{ObjectBuilder, ObjectObject, ObjectType};
pub use range::{RangeIter, RangeType, MAX_RANGE_STEPS};
pub use string::StrType;
pub use undef::UndefType;
pub use vector::{EmbeddedVectorType, VectorBuilder, VectorIter, VectorObject, VectorType};

/// Variant tag of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Undefined,
    Bool,
    Number,
    String,
    Vector,
    EmbeddedVector,
    Range,
    Function,
    Object,
}

impl ValueType {
    /// Name used in diagnostics. Embedded vectors report as `vector`.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Undefined => "undefined",
            ValueType::Bool => "bool",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Vector | ValueType::EmbeddedVector => "vector",
            ValueType::Range => "range",
            ValueType::Function => "function",
            ValueType::Object => "object",
        }
    }
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Undefined(UndefType),
    Bool(bool),
    Number(f64),
    String(StrType),
    Vector(VectorType),
    /// Only ever appears as an element being pushed into a vector.
    EmbeddedVector(EmbeddedVectorType),
    Range(Rc<RangeType>),
    Function(FunctionPtr),
    Object(ObjectType),
}

impl Value {
    /// Plain `undef` with no reason attached.
    pub fn undefined() -> Self {
        Value::Undefined(UndefType::new())
    }

    /// `undef` explaining why an operation had no result.
    pub fn undef(reason: impl Into<String>) -> Self {
        Value::Undefined(UndefType::with_reason(reason))
    }

    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn string(s: impl Into<StrType>) -> Self {
        Value::String(s.into())
    }

    pub fn range(range: RangeType) -> Self {
        Value::Range(Rc::new(range))
    }

    /// Unaccounted vector of `values`.
    pub fn vector(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Vector(VectorType::from_values(values))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Undefined(_) => ValueType::Undefined,
            Value::Bool(_) => ValueType::Bool,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Vector(_) => ValueType::Vector,
            Value::EmbeddedVector(_) => ValueType::EmbeddedVector,
            Value::Range(_) => ValueType::Range,
            Value::Function(_) => ValueType::Function,
            Value::Object(_) => ValueType::Object,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined(_))
    }

    /// `undef` whose reasons have not been reported yet.
    pub fn is_unchecked_undef(&self) -> bool {
        matches!(self, Value::Undefined(u) if u.is_unchecked())
    }

    /// Truthiness: `undef`, `false`, `0`, `""` and `[]` are false.
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Undefined(_) => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Vector(v) => !v.is_empty(),
            Value::EmbeddedVector(v) => !v.is_empty(),
            Value::Range(_) | Value::Function(_) | Value::Object(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Like [`Value::as_number`], rejecting infinities and NaN.
    pub fn as_finite_number(&self) -> Option<f64> {
        self.as_number().filter(|n| n.is_finite())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorType> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeType> {
        match self {
            Value::Range(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionPtr> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_undef(&self) -> Option<&UndefType> {
        match self {
            Value::Undefined(u) => Some(u),
            _ => None,
        }
    }

    /// Append context to the reasons of an `undef`; other values are
    /// returned unchanged.
    #[must_use]
    pub fn with_undef_reason(mut self, reason: impl Into<String>) -> Self {
        if let Value::Undefined(u) = &mut self {
            u.append(reason);
        }
        self
    }

    /// Reasons of an unchecked `undef`, marked as reported.
    pub fn take_undef_report(&self) -> Option<String> {
        self.as_undef().and_then(UndefType::take_report)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<VectorType> for Value {
    fn from(v: VectorType) -> Self {
        Value::Vector(v)
    }
}

impl From<ObjectType> for Value {
    fn from(o: ObjectType) -> Self {
        Value::Object(o)
    }
}

/// Structural equality for assertions in tests and builtins.
///
/// Unlike the `==` operator this never yields `undef`: undefined values
/// are equal to each other, objects compare member-wise and functions by
/// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined(_), Value::Undefined(_)) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::EmbeddedVector(a), Value::EmbeddedVector(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Range(a), Value::Range(b)) => a.range_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined(u) if u.reasons().is_empty() => f.write_str("undef"),
            Value::Undefined(u) => write!(f, "undef({})", u.reasons().join(" ")),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&scad_ir::format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Vector(v) => write!(f, "{v:?}"),
            Value::EmbeddedVector(v) => write!(f, "{v:?}"),
            Value::Range(r) => write!(f, "{}", format::DisplayRange(r)),
            Value::Function(func) => write!(f, "{func:?}"),
            Value::Object(o) => write!(f, "{o:?}"),
        }
    }
}

#[cfg(test)]
mod tests;
