//! Syntax tree consumed by the evaluator.
//!
//! The parser that produces these nodes lives outside this workspace; the
//! constructors on [`Expr`] and the builder methods on [`Scope`] let callers
//! and tests assemble trees directly.

mod assignment;
mod display;
mod expr;
mod operators;
mod scope;

pub use assignment::{Assignment, AssignmentList, ParameterList};
pub use display::{format_number, write_quoted, DisplayList};
pub use expr::{Expr, ExprKind, Literal, SharedExpr};
pub use operators::{BinaryOp, UnaryOp};
pub use scope::{ModuleInstantiation, Scope, UserFunction, UserModule};

#[cfg(test)]
mod tests;
