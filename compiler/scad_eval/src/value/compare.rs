//! Equality and ordering operators.
//!
//! Both return a [`Value`]: `true`/`false`, or `undef` when the comparison
//! has no meaning. Vector comparisons that hit such an element report the
//! index in the reason chain.

use std::cmp::Ordering;

use super::{Value, VectorType};

#[derive(Copy, Clone, PartialEq, Eq)]
enum Relation {
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Relation {
    fn symbol(self) -> &'static str {
        match self {
            Relation::Less => "<",
            Relation::Greater => ">",
            Relation::LessEqual => "<=",
            Relation::GreaterEqual => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Relation::Less => ordering == Ordering::Less,
            Relation::Greater => ordering == Ordering::Greater,
            Relation::LessEqual => ordering != Ordering::Greater,
            Relation::GreaterEqual => ordering != Ordering::Less,
        }
    }
}

fn index_reason(i: usize) -> String {
    format!("in vector comparison at index {i}")
}

fn vector_equals(a: &VectorType, b: &VectorType) -> Value {
    let mut left = a.iter();
    let mut right = b.iter();
    let mut i = 0;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => {
                let eq = x.equals(y);
                if eq.is_undefined() {
                    return eq.with_undef_reason(index_reason(i));
                }
                if !eq.to_bool() {
                    return Value::Bool(false);
                }
            }
            (None, None) => return Value::Bool(true),
            _ => return Value::Bool(false),
        }
        i += 1;
    }
}

/// Lexicographic `a < b`.
fn vector_less(a: &VectorType, b: &VectorType) -> Value {
    let mut left = a.iter();
    let mut right = b.iter();
    let mut i = 0;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => {
                let lt = x.less(y);
                if lt.is_undefined() {
                    return lt.with_undef_reason(index_reason(i));
                }
                if lt.to_bool() {
                    return Value::Bool(true);
                }
                if y.less(x).to_bool() {
                    return Value::Bool(false);
                }
            }
            (None, Some(_)) => return Value::Bool(true),
            (_, None) => return Value::Bool(false),
        }
        i += 1;
    }
}

fn negate_defined(v: Value) -> Value {
    match v {
        Value::Bool(b) => Value::Bool(!b),
        other => other,
    }
}

impl Value {
    /// `==`. Values of different types are unequal; `undef == undef`.
    pub fn equals(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Undefined(_), Value::Undefined(_)) => Value::Bool(true),
            (Value::Bool(a), Value::Bool(b)) => Value::Bool(a == b),
            (Value::Number(a), Value::Number(b)) => Value::Bool(a == b),
            (Value::String(a), Value::String(b)) => Value::Bool(a == b),
            (Value::Vector(a), Value::Vector(b)) => vector_equals(a, b),
            (Value::Range(a), Value::Range(b)) => Value::Bool(a.range_eq(b)),
            (Value::Function(a), Value::Function(b)) => Value::Bool(a.ptr_eq(b)),
            (Value::Object(_), Value::Object(_)) => {
                Value::undef("operation undefined (object == object)")
            }
            _ => Value::Bool(false),
        }
    }

    /// `!=`.
    pub fn not_equals(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Object(_), Value::Object(_)) => {
                Value::undef("operation undefined (object != object)")
            }
            _ => negate_defined(self.equals(rhs)),
        }
    }

    fn relation(&self, rhs: &Value, relation: Relation) -> Value {
        let ordering = match (self, rhs) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => {
                // Any comparison against NaN is false.
                let Some(ordering) = a.partial_cmp(b) else {
                    return Value::Bool(false);
                };
                ordering
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Range(a), Value::Range(b)) => a.range_cmp(b),
            (Value::Vector(a), Value::Vector(b)) => {
                return match relation {
                    Relation::Less => vector_less(a, b),
                    Relation::Greater => vector_less(b, a),
                    Relation::LessEqual => negate_defined(vector_less(b, a)),
                    Relation::GreaterEqual => negate_defined(vector_less(a, b)),
                };
            }
            (Value::Undefined(_), Value::Undefined(_))
            | (Value::Function(_), Value::Function(_))
            | (Value::Object(_), Value::Object(_)) => {
                return Value::undef(format!(
                    "operation undefined ({} {} {})",
                    self.type_name(),
                    relation.symbol(),
                    rhs.type_name()
                ));
            }
            _ => {
                return Value::undef(format!(
                    "undefined operation ({} {} {})",
                    self.type_name(),
                    relation.symbol(),
                    rhs.type_name()
                ));
            }
        };
        Value::Bool(relation.holds(ordering))
    }

    pub fn less(&self, rhs: &Value) -> Value {
        self.relation(rhs, Relation::Less)
    }

    pub fn greater(&self, rhs: &Value) -> Value {
        self.relation(rhs, Relation::Greater)
    }

    pub fn less_equal(&self, rhs: &Value) -> Value {
        self.relation(rhs, Relation::LessEqual)
    }

    pub fn greater_equal(&self, rhs: &Value) -> Value {
        self.relation(rhs, Relation::GreaterEqual)
    }
}
