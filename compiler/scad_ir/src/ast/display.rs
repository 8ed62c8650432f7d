//! Printing expressions back in surface syntax.
//!
//! Used when a function value is echoed and when an assertion reports the
//! condition that failed.

use std::fmt::{self, Write as _};

use super::{Assignment, Expr, ExprKind, Literal};

/// Render a number the way the language prints it.
///
/// Integral values print without a fraction, very large or very small
/// magnitudes switch to exponent notation with a signed, two-digit
/// exponent (`1e+21`, `2.5e-07`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }
    let magnitude = value.abs();
    if (1e-5..1e16).contains(&magnitude) {
        return format!("{value}");
    }
    let formatted = format!("{value:e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Write `s` as a double-quoted string literal.
pub fn write_quoted(f: &mut impl fmt::Write, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Undef => f.write_str("undef"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => f.write_str(&format_number(*n)),
            Literal::String(s) => write_quoted(f, s),
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&*self.name, &self.expr) {
            ("", Some(expr)) => write!(f, "{expr}"),
            (name, Some(expr)) => write!(f, "{name} = {expr}"),
            (name, None) => f.write_str(name),
        }
    }
}

/// Comma-separated assignment list.
pub struct DisplayList<'a>(pub &'a [Assignment]);

impl fmt::Display for DisplayList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, assignment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{assignment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{literal}"),
            ExprKind::Lookup(name) => f.write_str(name),
            ExprKind::MemberLookup { expr, member } => write!(f, "{expr}.{member}"),
            ExprKind::Index { expr, index } => write!(f, "{expr}[{index}]"),
            ExprKind::Unary { op, operand } => write!(f, "{}{operand}", op.as_symbol()),
            ExprKind::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.as_symbol())
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => write!(f, "({cond} ? {then_expr} : {else_expr})"),
            ExprKind::Range { begin, step, end } => match step {
                Some(step) => write!(f, "[{begin} : {step} : {end}]"),
                None => write!(f, "[{begin} : {end}]"),
            },
            ExprKind::Vector(elements) => {
                f.write_char('[')?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_char(']')
            }
            ExprKind::Call { callee, args } => {
                write!(f, "{}({})", Expr::call_name(callee), DisplayList(args))
            }
            ExprKind::FunctionLiteral { params, body } => {
                write!(f, "function({}) {body}", DisplayList(params))
            }
            ExprKind::Assert { args, body } => {
                write!(f, "assert({})", DisplayList(args))?;
                match body {
                    Some(body) => write!(f, " {body}"),
                    None => Ok(()),
                }
            }
            ExprKind::Echo { args, body } => {
                write!(f, "echo({})", DisplayList(args))?;
                match body {
                    Some(body) => write!(f, " {body}"),
                    None => Ok(()),
                }
            }
            ExprKind::Let { assignments, body } => {
                write!(f, "let({}) {body}", DisplayList(assignments))
            }
            ExprKind::LcIf {
                cond,
                then_expr,
                else_expr,
            } => {
                write!(f, "if({cond}) ({then_expr})")?;
                match else_expr {
                    Some(else_expr) => write!(f, " else ({else_expr})"),
                    None => Ok(()),
                }
            }
            ExprKind::LcEach(expr) => write!(f, "each ({expr})"),
            ExprKind::LcFor { assignments, body } => {
                write!(f, "for({}) ({body})", DisplayList(assignments))
            }
            ExprKind::LcForC {
                init,
                cond,
                incr,
                body,
            } => write!(
                f,
                "for({};{cond};{}) {body}",
                DisplayList(init),
                DisplayList(incr)
            ),
            ExprKind::LcLet { assignments, body } => {
                write!(f, "let({}) ({body})", DisplayList(assignments))
            }
        }
    }
}
