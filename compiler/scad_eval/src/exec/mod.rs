//! Expression evaluation.
//!
//! [`Evaluator::eval`] is the single entry point. Every call first checks
//! the native stack guard, then dispatches on the expression kind. A
//! warning escalated by "stop on first warning" is raised both on entry
//! and before the step's value is returned. The kinds:
//!
//! - `expr` kinds without further reduction (literals, lookups, operators,
//!   ranges, vectors, function literals) are evaluated here, recursing
//!   into their operands.
//! - `call`: ternary, `assert`, `echo`, `let` and function calls run in a
//!   trampoline so tail calls do not grow the native stack.
//! - `comprehension`: the `if`/`each`/`for`/`let` clauses of list
//!   comprehensions.
//! - `module`: binding of module instantiations.

mod call;
mod comprehension;
mod module;
mod parameters;

use std::rc::Rc;

use rustc_hash::FxHashSet;
use scad_ir::{Assignment, BinaryOp, ExprKind, Literal, Location, SharedExpr, UnaryOp};

use crate::context::{Context, ContextHandle, ContextKind};
use crate::diagnostics::MessageGroup;
use crate::errors::{EvalError, EvalResult};
use crate::session::EvaluationSession;
use crate::value::{FunctionPtr, FunctionType, RangeType, Value, VectorBuilder};

pub use module::ModuleCall;
pub use parameters::{Argument, Arguments, Parameters};

/// Evaluates expressions within one session.
#[derive(Copy, Clone)]
pub struct Evaluator<'s> {
    session: &'s EvaluationSession,
}

impl<'s> Evaluator<'s> {
    pub fn new(session: &'s EvaluationSession) -> Self {
        Evaluator { session }
    }

    pub fn session(&self) -> &'s EvaluationSession {
        self.session
    }

    /// Evaluate `expr` in `context`.
    pub fn eval(&self, expr: &SharedExpr, context: &Context) -> EvalResult {
        if let Err(exhausted) = scad_stack::check_stack(self.session.config().stack_red_zone) {
            return Err(self.raise(EvalError::from(exhausted), &expr.location));
        }
        if let Some(err) = self.session.take_pending_error() {
            return Err(err);
        }
        let value = self.eval_kind(expr, context)?;
        // A warning from this step escalates before its value is used.
        match self.session.take_pending_error() {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    fn eval_kind(&self, expr: &SharedExpr, context: &Context) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal_value(literal)),
            ExprKind::Lookup(name) => context.lookup_variable(name, &expr.location, self.session),
            ExprKind::MemberLookup { expr: object, member } => {
                Ok(self.eval(object, context)?.member(member))
            }
            ExprKind::Index { expr: array, index } => {
                let array = self.eval(array, context)?;
                let index = self.eval(index, context)?;
                Ok(array.index(&index))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand, context)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!operand.to_bool())),
                    UnaryOp::Neg => Ok(self.check_undef(operand.negate(), &expr.location)),
                }
            }
            ExprKind::Binary { op, left, right } => {
                self.eval_binary(*op, left, right, context, &expr.location)
            }
            ExprKind::Range { begin, step, end } => {
                self.eval_range(expr, begin, step.as_ref(), end, context)
            }
            ExprKind::Vector(elements) => self.eval_vector(elements, context),
            ExprKind::FunctionLiteral { params, body } => Ok(Value::Function(FunctionPtr::new(
                FunctionType::new(context.clone(), Rc::clone(params), Rc::clone(body)),
            ))),
            ExprKind::Ternary { .. }
            | ExprKind::Assert { .. }
            | ExprKind::Echo { .. }
            | ExprKind::Let { .. }
            | ExprKind::Call { .. } => self.eval_tail(expr, context),
            ExprKind::LcIf { .. }
            | ExprKind::LcEach(_)
            | ExprKind::LcFor { .. }
            | ExprKind::LcForC { .. }
            | ExprKind::LcLet { .. } => self.eval_comprehension(expr, context),
        }
    }

    /// Log `err` as an `ERROR` message and arm its trace budget.
    #[cold]
    pub(crate) fn raise(&self, err: EvalError, location: &Location) -> EvalError {
        let err = err
            .with_location(location.clone())
            .with_trace_depth(self.session.config().trace_depth);
        self.session
            .log(MessageGroup::Error, err.location.clone(), err.message.clone());
        err
    }

    /// Report the reasons of a fresh `undef` once, as a warning.
    fn check_undef(&self, value: Value, location: &Location) -> Value {
        if let Some(report) = value.take_undef_report() {
            self.session
                .log(MessageGroup::Warning, location.clone(), report);
        }
        value
    }

    fn warn(&self, location: &Location, text: impl Into<String>) {
        self.session.log(MessageGroup::Warning, location.clone(), text);
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &SharedExpr,
        right: &SharedExpr,
        context: &Context,
        location: &Location,
    ) -> EvalResult {
        match op {
            BinaryOp::And => Ok(Value::Bool(
                self.eval(left, context)?.to_bool() && self.eval(right, context)?.to_bool(),
            )),
            BinaryOp::Or => Ok(Value::Bool(
                self.eval(left, context)?.to_bool() || self.eval(right, context)?.to_bool(),
            )),
            _ => {
                let lhs = self.eval(left, context)?;
                let rhs = self.eval(right, context)?;
                Ok(self.check_undef(lhs.binary_op(op, &rhs), location))
            }
        }
    }

    /// `[begin : end]` and `[begin : step : end]`. Non-number bounds give
    /// `undef`.
    fn eval_range(
        &self,
        expr: &SharedExpr,
        begin: &SharedExpr,
        step: Option<&SharedExpr>,
        end: &SharedExpr,
        context: &Context,
    ) -> EvalResult {
        let Some(mut begin) = self.eval(begin, context)?.as_number() else {
            return Ok(Value::undefined());
        };
        let Some(mut end) = self.eval(end, context)?.as_number() else {
            return Ok(Value::undefined());
        };
        let Some(step) = step else {
            if end < begin {
                std::mem::swap(&mut begin, &mut end);
                self.session.log(
                    MessageGroup::Deprecated,
                    expr.location.clone(),
                    "Using ranges of the form [begin:end] with begin value greater than the end value is deprecated",
                );
            }
            return Ok(Value::range(RangeType::with_default_step(begin, end)));
        };
        let Some(step) = self.eval(step, context)?.as_number() else {
            return Ok(Value::undefined());
        };
        if expr.is_literal() {
            if step > 0.0 && end < begin {
                self.warn(&expr.location, "begin is greater than the end, but step is positive");
            } else if step < 0.0 && end > begin {
                self.warn(&expr.location, "begin is smaller than the end, but step is negative");
            }
        }
        Ok(Value::range(RangeType::new(begin, step, end)))
    }

    fn eval_vector(&self, elements: &[SharedExpr], context: &Context) -> EvalResult {
        if let [single] = elements {
            let value = self.eval(single, context)?;
            if let Value::EmbeddedVector(embedded) = value {
                return Ok(Value::Vector(embedded.into_vector()));
            }
            let mut out = VectorBuilder::with_capacity(1, Some(self.session.accounting().clone()));
            out.push(value);
            return Ok(Value::Vector(out.build()));
        }
        let mut out =
            VectorBuilder::with_capacity(elements.len(), Some(self.session.accounting().clone()));
        for element in elements {
            out.push(self.eval(element, context)?);
        }
        Ok(Value::Vector(out.build()))
    }

    /// New child context of `parent` with `assignments` bound in order.
    ///
    /// Each assignment sees the ones before it. Unnamed and repeated
    /// assignments warn and are skipped.
    pub(crate) fn sequential_assignment(
        &self,
        assignments: &[Assignment],
        location: &Location,
        parent: &Context,
    ) -> Result<ContextHandle<'s>, EvalError> {
        let handle = self.session.new_context(parent, ContextKind::Plain);
        self.assign_sequentially(assignments, location, &handle)?;
        Ok(handle)
    }

    pub(crate) fn assign_sequentially(
        &self,
        assignments: &[Assignment],
        location: &Location,
        target: &Context,
    ) -> Result<(), EvalError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for assignment in assignments {
            let value = match &assignment.expr {
                Some(expr) => self.eval(expr, target)?,
                None => Value::undefined(),
            };
            if assignment.is_positional() {
                self.warn(
                    location,
                    format!("Assignment without variable name {}", value.to_echo_string()),
                );
            } else if !seen.insert(&assignment.name) {
                self.warn(
                    location,
                    format!(
                        "Ignoring duplicate variable assignment {} = {}",
                        assignment.name,
                        value.to_echo_string()
                    ),
                );
            } else {
                target.set_variable(Rc::clone(&assignment.name), value);
            }
        }
        Ok(())
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Undef => Value::undefined(),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::string(Rc::clone(s)),
    }
}
