//! Scad Eval - evaluation runtime for the scad modeling language.
//!
//! This crate evaluates the syntax trees of `scad_ir` to runtime values.
//!
//! # Architecture
//!
//! - `value`: the closed [`Value`] union and its total operators
//! - `context`: the parent-linked scope chain with its variable frames
//! - `session`: per-run state (special variable frames, namespaces,
//!   source files, timers, diagnostics, heap accounting)
//! - `memory`: the collector that reclaims contexts kept alive only by
//!   reference cycles through closures
//! - `exec`: the evaluator with its tail-call trampoline, list
//!   comprehensions and argument binding
//! - `builtins`: the builtin function registry
//!
//! Everything is single-threaded. A session is created per evaluation and
//! passed by shared reference.

pub mod accounting;
pub mod builtins;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod errors;
pub mod exec;
pub mod memory;
pub mod print_handler;
pub mod session;
pub mod timers;
pub mod value;

pub use config::{EvalConfig, PrintTarget};
pub use context::{Context, ContextHandle, ContextKind};
pub use diagnostics::{init_tracing, Message, MessageGroup};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use exec::{Arguments, Evaluator, ModuleCall, Parameters};
pub use session::{EvaluationSession, ModuleFrame, SessionBuilder};
pub use value::{Value, ValueType};

#[cfg(test)]
mod tests;
