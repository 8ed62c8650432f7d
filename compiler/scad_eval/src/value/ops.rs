//! Arithmetic, indexing and member access.

use scad_ir::{BinaryOp, UnaryOp};

use super::{Value, VectorBuilder, VectorType};

#[cold]
fn undefined_binary(lhs: &Value, symbol: &str, rhs: &Value) -> Value {
    Value::undef(format!(
        "undefined operation ({} {symbol} {})",
        lhs.type_name(),
        rhs.type_name()
    ))
}

/// Index conversion: truncate toward zero; negative, NaN and
/// out-of-range doubles map to `u32::MAX`, which is never a valid index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn convert_to_u32(index: f64) -> u32 {
    if index >= 0.0 && index < f64::from(u32::MAX) {
        index as u32
    } else {
        u32::MAX
    }
}

/// Elementwise combination up to the shorter length.
fn zip_vectors(a: &VectorType, b: &VectorType, f: impl Fn(&Value, &Value) -> Value) -> Value {
    let mut out = VectorBuilder::with_capacity(a.len().min(b.len()), a.accounting());
    for (x, y) in a.iter().zip(b.iter()) {
        out.push(f(x, y));
    }
    Value::Vector(out.build())
}

fn map_vector(v: &VectorType, f: impl Fn(&Value) -> Value) -> Value {
    let mut out = VectorBuilder::with_capacity(v.len(), v.accounting());
    for x in v.iter() {
        out.push(f(x));
    }
    Value::Vector(out.build())
}

fn dot(a: &[Value], b: &[Value]) -> Value {
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        match (x, y) {
            (Value::Number(x), Value::Number(y)) => sum += x * y,
            _ => return undefined_binary(x, "*", y),
        }
    }
    Value::Number(sum)
}

fn matrix_times_vector(matrix: &VectorType, vector: &[Value]) -> Value {
    let mut out = VectorBuilder::with_capacity(matrix.len(), matrix.accounting());
    for (i, row) in matrix.iter().enumerate() {
        let row = match row.as_vector() {
            Some(row) if row.len() == vector.len() => row.as_slice(),
            _ => return Value::undef(format!("Matrix must be rectangular. Problem at row {i}")),
        };
        let mut sum = 0.0;
        for (j, (m, v)) in row.iter().zip(vector).enumerate() {
            let Value::Number(m) = m else {
                return Value::undef(format!(
                    "Matrix must contain only numbers. Problem at row {i}, col {j}"
                ));
            };
            let Value::Number(v) = v else {
                return Value::undef(format!(
                    "Vector must contain only numbers. Problem at index {j}"
                ));
            };
            sum += m * v;
        }
        out.push(Value::Number(sum));
    }
    Value::Vector(out.build())
}

/// `vector * matrix`; the caller guarantees matching lengths and a vector
/// first row.
fn vector_times_matrix(vector: &[Value], matrix: &VectorType) -> Value {
    let rows = matrix.as_slice();
    let columns = rows
        .first()
        .and_then(Value::as_vector)
        .map_or(0, VectorType::len);
    let mut out = VectorBuilder::with_capacity(columns, matrix.accounting());
    for i in 0..columns {
        let mut sum = 0.0;
        for (j, (v, row)) in vector.iter().zip(rows).enumerate() {
            let row = match row.as_vector() {
                Some(row) if row.len() == columns => row,
                _ => return Value::undef(format!("Matrix must be rectangular. Problem at row {j}")),
            };
            let Value::Number(v) = v else {
                return Value::undef(format!(
                    "Vector must contain only numbers. Problem at index {j}"
                ));
            };
            let Some(Value::Number(m)) = row.get(i) else {
                return Value::undef(format!(
                    "Matrix must contain only numbers. Problem at row {j}, col {i}"
                ));
            };
            sum += v * m;
        }
        out.push(Value::Number(sum));
    }
    Value::Vector(out.build())
}

fn multiply_vectors(a: &VectorType, b: &VectorType) -> Value {
    let (Some(first_a), Some(first_b)) = (a.iter().next(), b.iter().next()) else {
        return Value::undef("Multiplication is undefined on empty vectors");
    };
    let (len_a, len_b) = (a.len(), b.len());
    match (first_a, first_b) {
        (Value::Number(_), Value::Number(_)) => {
            if len_a == len_b {
                dot(a.as_slice(), b.as_slice())
            } else {
                Value::undef(format!(
                    "vector*vector requires matching lengths ({len_a} != {len_b})"
                ))
            }
        }
        (Value::Number(_), Value::Vector(_)) => {
            if len_a == len_b {
                vector_times_matrix(a.as_slice(), b)
            } else {
                Value::undef(format!(
                    "vector*matrix requires vector length to match matrix row count ({len_a} != {len_b})"
                ))
            }
        }
        (Value::Vector(row), Value::Number(_)) => {
            if row.len() == len_b {
                matrix_times_vector(a, b.as_slice())
            } else {
                Value::undef(format!(
                    "matrix*vector requires matrix column count to match vector length ({} != {len_b})",
                    row.len()
                ))
            }
        }
        (Value::Vector(row), Value::Vector(_)) => {
            if row.len() != len_b {
                return Value::undef(format!(
                    "matrix*matrix requires left operand column count to match right operand row count ({} != {len_b})",
                    row.len()
                ));
            }
            let mut out = VectorBuilder::with_capacity(len_a, a.accounting());
            for (i, src_row) in a.iter().enumerate() {
                let Some(src_row) = src_row.as_vector().filter(|r| r.len() == len_b) else {
                    let found = src_row.as_vector().map_or(0, VectorType::len);
                    return Value::undef(format!(
                        "matrix*matrix left operand row length does not match right operand row count ({found} != {len_b}) at row {i}"
                    ));
                };
                let product = vector_times_matrix(src_row.as_slice(), b);
                if product.is_undefined() {
                    return product.with_undef_reason(format!(
                        "while processing left operand at row {i}"
                    ));
                }
                out.push(product);
            }
            Value::Vector(out.build())
        }
        _ => Value::undef(format!(
            "undefined vector*vector multiplication where first elements are types {} and {}",
            first_a.type_name(),
            first_b.type_name()
        )),
    }
}

impl Value {
    pub fn plus(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::Vector(a), Value::Vector(b)) => zip_vectors(a, b, Value::plus),
            _ => undefined_binary(self, "+", rhs),
        }
    }

    pub fn minus(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a - b),
            (Value::Vector(a), Value::Vector(b)) => zip_vectors(a, b, Value::minus),
            _ => undefined_binary(self, "-", rhs),
        }
    }

    pub fn multiply(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a * b),
            (Value::Vector(v), Value::Number(_)) => map_vector(v, |x| x.multiply(rhs)),
            (Value::Number(_), Value::Vector(v)) => map_vector(v, |x| x.multiply(self)),
            (Value::Vector(a), Value::Vector(b)) => multiply_vectors(a, b),
            _ => undefined_binary(self, "*", rhs),
        }
    }

    pub fn divide(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a / b),
            (Value::Vector(v), Value::Number(_)) => map_vector(v, |x| x.divide(rhs)),
            (Value::Number(_), Value::Vector(v)) => map_vector(v, |x| self.divide(x)),
            _ => undefined_binary(self, "/", rhs),
        }
    }

    /// `%`, with the sign of the dividend like C's `fmod`.
    pub fn modulo(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a % b),
            _ => undefined_binary(self, "%", rhs),
        }
    }

    pub fn power(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a.powf(*b)),
            _ => undefined_binary(self, "^", rhs),
        }
    }

    pub fn negate(&self) -> Value {
        match self {
            Value::Number(n) => Value::Number(-n),
            Value::Vector(v) => map_vector(v, Value::negate),
            _ => Value::undef(format!("undefined operation (-{})", self.type_name())),
        }
    }

    pub fn logical_not(&self) -> Value {
        Value::Bool(!self.to_bool())
    }

    pub fn unary_op(&self, op: UnaryOp) -> Value {
        match op {
            UnaryOp::Not => self.logical_not(),
            UnaryOp::Neg => self.negate(),
        }
    }

    /// Apply a strict binary operator. `&&` and `||` are handled here on
    /// already evaluated operands; the evaluator short-circuits them.
    pub fn binary_op(&self, op: BinaryOp, rhs: &Value) -> Value {
        match op {
            BinaryOp::And => Value::Bool(self.to_bool() && rhs.to_bool()),
            BinaryOp::Or => Value::Bool(self.to_bool() || rhs.to_bool()),
            BinaryOp::Pow => self.power(rhs),
            BinaryOp::Mul => self.multiply(rhs),
            BinaryOp::Div => self.divide(rhs),
            BinaryOp::Mod => self.modulo(rhs),
            BinaryOp::Add => self.plus(rhs),
            BinaryOp::Sub => self.minus(rhs),
            BinaryOp::Lt => self.less(rhs),
            BinaryOp::LtEq => self.less_equal(rhs),
            BinaryOp::Gt => self.greater(rhs),
            BinaryOp::GtEq => self.greater_equal(rhs),
            BinaryOp::Eq => self.equals(rhs),
            BinaryOp::NotEq => self.not_equals(rhs),
        }
    }

    /// `value[index]`. Strings index by grapheme.
    pub fn index(&self, index: &Value) -> Value {
        match (self, index) {
            (Value::String(s), Value::Number(i)) => {
                let i = convert_to_u32(*i) as usize;
                s.grapheme(i).map_or_else(Value::undefined, Value::from)
            }
            (Value::Vector(v), Value::Number(i)) => {
                let i = convert_to_u32(*i);
                match v.get(i as usize) {
                    Some(item) => item.clone(),
                    None => Value::undef(format!(
                        "index {i} out of bounds for vector of size {}",
                        v.len()
                    )),
                }
            }
            (Value::Object(o), Value::String(key)) => {
                o.get(key.as_str()).cloned().unwrap_or_else(Value::undefined)
            }
            (Value::Range(r), Value::Number(i)) => match convert_to_u32(*i) {
                0 => Value::Number(r.begin()),
                1 => Value::Number(r.step()),
                2 => Value::Number(r.end()),
                _ => Value::undef(
                    "subscript operator only defined for indices 0-2 on range (begin,step,end)",
                ),
            },
            _ => Value::undef(format!(
                "undefined operation {}[{}]",
                self.type_name(),
                index.type_name()
            )),
        }
    }

    /// `value[i]` for a known position.
    #[allow(clippy::cast_precision_loss)]
    pub fn index_at(&self, i: usize) -> Value {
        self.index(&Value::Number(i as f64))
    }

    /// `value.member`: swizzles on vectors, bounds on ranges, members on
    /// objects; `undef` for everything else.
    pub fn member(&self, member: &str) -> Value {
        match self {
            Value::Vector(v) => {
                if let Some(position) = swizzle_position(member) {
                    return self.index_at(position);
                }
                if member.len() > 1 && is_swizzle(member) {
                    let mut out = VectorBuilder::with_capacity(member.len(), v.accounting());
                    for c in member.chars() {
                        if let Some(position) = swizzle_char_position(c) {
                            out.push(self.index_at(position));
                        }
                    }
                    return Value::Vector(out.build());
                }
                Value::undefined()
            }
            Value::Range(_) => match member {
                "begin" => self.index_at(0),
                "step" => self.index_at(1),
                "end" => self.index_at(2),
                _ => Value::undefined(),
            },
            Value::Object(o) => o.get(member).cloned().unwrap_or_else(Value::undefined),
            _ => Value::undefined(),
        }
    }
}

fn swizzle_char_position(c: char) -> Option<usize> {
    match c {
        'x' | 'r' => Some(0),
        'y' | 'g' => Some(1),
        'z' | 'b' => Some(2),
        'w' | 'a' => Some(3),
        _ => None,
    }
}

fn swizzle_position(member: &str) -> Option<usize> {
    let mut chars = member.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => swizzle_char_position(c),
        _ => None,
    }
}

/// One to four characters, all from `xyzw` or all from `rgba`.
fn is_swizzle(member: &str) -> bool {
    (1..=4).contains(&member.len())
        && (member.chars().all(|c| "xyzw".contains(c)) || member.chars().all(|c| "rgba".contains(c)))
}
