//! Scad IR - syntax tree types for the scad evaluator.
//!
//! This crate contains the data structures the evaluator consumes:
//! - Locations for diagnostics
//! - Expression nodes and operators
//! - Statement blocks with their function, module and namespace members
//! - Source files and their `use`d libraries
//!
//! Nodes are immutable once built. Expressions are shared through
//! `Rc<Expr>` so closures can keep their bodies alive independently of the
//! tree that defined them.

pub mod ast;
mod location;
mod source_file;

pub use ast::{
    format_number, Assignment, AssignmentList, BinaryOp, DisplayList, Expr, ExprKind, Literal,
    ModuleInstantiation, ParameterList, Scope, SharedExpr, UnaryOp, UserFunction, UserModule,
};
pub use location::Location;
pub use source_file::SourceFile;
