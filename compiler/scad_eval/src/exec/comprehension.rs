//! List comprehension clauses.
//!
//! Every clause evaluates to an embedded vector (or, for `each` on a
//! scalar, the scalar itself) that the enclosing vector literal splices
//! in.

use std::rc::Rc;

use scad_ir::{Assignment, ExprKind, Location, SharedExpr};

use super::Evaluator;
use crate::context::{Context, ContextKind};
use crate::errors::{self, EvalError, EvalResult};
use crate::value::{EmbeddedVectorType, Value, VectorBuilder};

impl<'s> Evaluator<'s> {
    pub(super) fn eval_comprehension(&self, expr: &SharedExpr, context: &Context) -> EvalResult {
        match &expr.kind {
            ExprKind::LcIf {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval(cond, context)?.to_bool() {
                    self.eval(then_expr, context)
                } else if let Some(else_expr) = else_expr {
                    self.eval(else_expr, context)
                } else {
                    Ok(Value::EmbeddedVector(EmbeddedVectorType::empty()))
                }
            }
            ExprKind::LcEach(inner) => {
                let value = self.eval(inner, context)?;
                Ok(self.each(value, &expr.location))
            }
            ExprKind::LcFor { assignments, body } => {
                let mut out = self.builder();
                self.for_each(assignments, 0, &expr.location, context, &mut |iteration| {
                    out.push(self.eval(body, iteration)?);
                    Ok(())
                })?;
                Ok(Value::EmbeddedVector(out.build_embedded()))
            }
            ExprKind::LcForC {
                init,
                cond,
                incr,
                body,
            } => self.for_c(init, cond, incr, body, &expr.location, context),
            ExprKind::LcLet { assignments, body } => {
                let let_context = self.sequential_assignment(assignments, &expr.location, context)?;
                self.eval(body, &let_context)
            }
            _ => self.eval(expr, context),
        }
    }

    fn builder(&self) -> VectorBuilder {
        VectorBuilder::new(Some(self.session.accounting().clone()))
    }

    /// Whether a collection of `steps` elements may be iterated; warns if
    /// not.
    fn check_range_steps(&self, steps: u32, location: &Location) -> bool {
        if steps < self.session.config().range_limit {
            return true;
        }
        self.warn(
            location,
            format!("Bad range parameter in for statement: too many elements ({steps})"),
        );
        false
    }

    /// Spread `value` into its elements.
    fn each(&self, value: Value, location: &Location) -> Value {
        match value {
            Value::Range(range) => {
                if !self.check_range_steps(range.num_values(), location) {
                    return Value::EmbeddedVector(EmbeddedVectorType::empty());
                }
                let mut out = self.builder();
                out.extend(range.iter().map(Value::Number));
                Value::EmbeddedVector(out.build_embedded())
            }
            Value::Vector(vector) => Value::EmbeddedVector(vector.into_embedded()),
            Value::EmbeddedVector(embedded) => {
                let mut out = self.builder();
                for element in embedded.iter() {
                    out.push(self.each(element.clone(), location));
                }
                Value::EmbeddedVector(out.build_embedded())
            }
            Value::String(text) => {
                let mut out = self.builder();
                out.extend(text.graphemes().map(Value::string));
                Value::EmbeddedVector(out.build_embedded())
            }
            Value::Undefined(_) => Value::EmbeddedVector(EmbeddedVectorType::empty()),
            other => other,
        }
    }

    /// Run `body` once per combination of the values of `assignments`
    /// from `index` on, each in a fresh context binding the variables.
    fn for_each(
        &self,
        assignments: &[Assignment],
        index: usize,
        location: &Location,
        context: &Context,
        body: &mut dyn FnMut(&Context) -> Result<(), EvalError>,
    ) -> Result<(), EvalError> {
        let Some(assignment) = assignments.get(index) else {
            return body(context);
        };
        let values = match &assignment.expr {
            Some(expr) => self.eval(expr, context)?,
            None => Value::undefined(),
        };
        let mut iterate = |value: Value| -> Result<(), EvalError> {
            let iteration = self.session.new_context(context, ContextKind::Plain);
            iteration.set_variable(Rc::clone(&assignment.name), value);
            self.for_each(assignments, index + 1, location, &iteration, body)
        };
        match values {
            Value::Range(range) => {
                if self.check_range_steps(range.num_values(), location) {
                    for n in range.iter() {
                        iterate(Value::Number(n))?;
                    }
                }
            }
            Value::Vector(vector) => {
                for element in vector.iter() {
                    iterate(element.clone())?;
                }
            }
            Value::Object(object) => {
                for key in object.keys() {
                    iterate(Value::string(Rc::clone(key)))?;
                }
            }
            Value::String(text) => {
                for grapheme in text.graphemes() {
                    iterate(Value::string(grapheme))?;
                }
            }
            Value::Undefined(_) => {}
            other => iterate(other)?,
        }
        Ok(())
    }

    /// `for (init; cond; incr) body`.
    ///
    /// Each increment is evaluated in the previous iteration's context and
    /// then re-parented to the initial context, so the chain never grows
    /// while closures captured in earlier iterations keep their context.
    fn for_c(
        &self,
        init: &[Assignment],
        cond: &SharedExpr,
        incr: &[Assignment],
        body: &SharedExpr,
        location: &Location,
        context: &Context,
    ) -> EvalResult {
        let limit = self.session.config().loop_limit;
        let mut out = self.builder();

        let initial = self.sequential_assignment(init, location, context)?;
        let mut current = self.session.new_context(&initial, ContextKind::Plain);
        let mut counter = 0usize;
        while self.eval(cond, &current)?.to_bool() {
            out.push(self.eval(body, &current)?);

            if counter == limit {
                return Err(self.raise(errors::loop_counter_exceeded(), location));
            }
            counter += 1;

            let next = self.sequential_assignment(incr, location, &current)?;
            next.set_parent(Some(initial.context().clone()));
            current.replace_with(next);
        }
        Ok(Value::EmbeddedVector(out.build_embedded()))
    }
}
