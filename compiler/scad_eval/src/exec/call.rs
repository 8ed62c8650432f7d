//! Tail-call trampoline.
//!
//! Ternaries, `assert`, `echo`, `let` and function calls all end in a
//! single continuation expression. Instead of recursing into it,
//! [`Evaluator::eval_tail`] loops: each step either produces a value or
//! swaps in the continuation, possibly together with a fresh context that
//! replaces the previous one. A self-recursive function in tail position
//! therefore runs in constant native stack.

use std::rc::Rc;

use scad_ir::{Assignment, Expr, ExprKind, Location, ParameterList, SharedExpr};

use super::{Arguments, Evaluator, Parameters};
use crate::builtins::BuiltinCall;
use crate::context::{CallableFunction, Context, ContextHandle, ContextKind};
use crate::diagnostics::MessageGroup;
use crate::errors::{self, EvalError, EvalResult};
use crate::value::Value;

/// Outcome of one simplification step.
enum Step<'s> {
    Done(Value),
    Continue {
        expr: SharedExpr,
        /// Replaces the current context when present.
        context: Option<ContextHandle<'s>>,
        /// Set when the step entered a function body.
        call: Option<SharedExpr>,
    },
}

impl Step<'_> {
    /// Continue with `body` in the same context; no body means `undef`.
    fn body(body: Option<&SharedExpr>) -> Self {
        match body {
            Some(body) => Step::Continue {
                expr: Rc::clone(body),
                context: None,
                call: None,
            },
            None => Step::Done(Value::undefined()),
        }
    }
}

/// Name of the function a call expression invokes.
fn call_name(call: &Expr) -> String {
    match &call.kind {
        ExprKind::Call { callee, .. } => Expr::call_name(callee),
        _ => call.to_string(),
    }
}

impl<'s> Evaluator<'s> {
    pub(super) fn eval_tail(&self, expr: &SharedExpr, context: &Context) -> EvalResult {
        let limit = self.session.config().recursion_limit;
        let mut expr = Rc::clone(expr);
        let mut handle: Option<ContextHandle<'s>> = None;
        let mut current_call = matches!(expr.kind, ExprKind::Call { .. }).then(|| Rc::clone(&expr));
        let mut calls = 0usize;

        let mut err = loop {
            let current = handle.as_ref().map_or(context, |h| h.context());
            match self.simplify(&expr, current) {
                Ok(Step::Done(value)) => return Ok(value),
                Ok(Step::Continue {
                    expr: next,
                    context: next_context,
                    call,
                }) => {
                    expr = next;
                    if let Some(next_context) = next_context {
                        match &mut handle {
                            Some(handle) => handle.replace_with(next_context),
                            None => handle = Some(next_context),
                        }
                    }
                    let Some(call) = call else {
                        continue;
                    };
                    if calls == limit {
                        let err =
                            self.raise(errors::recursion_detected(&call_name(&call)), &call.location);
                        current_call = Some(call);
                        break err;
                    }
                    calls += 1;
                    tracing::trace!(function = %call_name(&call), calls, "entering function body");
                    current_call = Some(call);
                }
                Err(err) => break err,
            }
        };

        if let Some(call) = &current_call {
            let message = format!("called by '{}'", call_name(call));
            err.trace(self.session, &message, &call.location);
        }
        Err(err)
    }

    fn simplify(&self, expr: &SharedExpr, context: &Context) -> Result<Step<'s>, EvalError> {
        match &expr.kind {
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let branch = if self.eval(cond, context)?.to_bool() {
                    then_expr
                } else {
                    else_expr
                };
                Ok(Step::body(Some(branch)))
            }
            ExprKind::Assert { args, body } => {
                self.perform_assert(args, &expr.location, context)?;
                Ok(Step::body(body.as_ref()))
            }
            ExprKind::Echo { args, body } => {
                let arguments = Arguments::evaluate(args, context, self)?;
                self.session
                    .log(MessageGroup::Echo, Location::NONE, arguments.to_string());
                Ok(Step::body(body.as_ref()))
            }
            ExprKind::Let { assignments, body } => {
                let let_context = self.session.new_context(context, ContextKind::Plain);
                let_context.apply_config_variables(context);
                self.assign_sequentially(assignments, &expr.location, &let_context)?;
                Ok(Step::Continue {
                    expr: Rc::clone(body),
                    context: Some(let_context),
                    call: None,
                })
            }
            ExprKind::Call { callee, args } => self.simplify_call(expr, callee, args, context),
            _ => Ok(Step::Done(self.eval(expr, context)?)),
        }
    }

    /// Resolve the callee of a call expression.
    fn resolve_callee(
        &self,
        expr: &Expr,
        callee: &SharedExpr,
        context: &Context,
    ) -> Result<Option<CallableFunction>, EvalError> {
        if let ExprKind::Lookup(name) = &callee.kind {
            return context.lookup_function(name, &expr.location, self.session);
        }
        match self.eval(callee, context)? {
            Value::Function(function) => Ok(Some(CallableFunction::Value(function))),
            other => {
                self.warn(
                    &expr.location,
                    format!("Can't call function on {}", other.type_name()),
                );
                Ok(None)
            }
        }
    }

    /// Builtins are evaluated right away. User functions and function
    /// values bind their arguments in a fresh context under the defining
    /// context and continue with their body.
    fn simplify_call(
        &self,
        expr: &SharedExpr,
        callee: &SharedExpr,
        args: &[Assignment],
        context: &Context,
    ) -> Result<Step<'s>, EvalError> {
        let Some(function) = self.resolve_callee(expr, callee, context)? else {
            return Ok(Step::Done(Value::undefined()));
        };
        let (defining, params, body): (Context, ParameterList, SharedExpr) = match function {
            CallableFunction::Builtin(builtin) => {
                let call = BuiltinCall {
                    session: self.session,
                    context,
                    name: builtin.name,
                    args,
                    location: &expr.location,
                };
                return Ok(Step::Done(builtin.call(&call)?));
            }
            CallableFunction::User { context, function } => (
                context,
                Rc::clone(&function.params),
                Rc::clone(&function.body),
            ),
            CallableFunction::Value(function) => (
                function.context.clone(),
                Rc::clone(&function.params),
                Rc::clone(&function.body),
            ),
        };

        let arguments = Arguments::evaluate(args, context, self)?;
        let body_context = self.session.new_context(&defining, ContextKind::Plain);
        body_context.apply_config_variables(context);
        let parameters = Parameters::parse(arguments, &expr.location, &params, &defining, self)?;
        body_context.apply_variables(parameters.frame());

        Ok(Step::Continue {
            expr: body,
            context: Some(body_context),
            call: Some(Rc::clone(expr)),
        })
    }

    /// `assert(condition, message)`: a false condition logs an error and
    /// aborts.
    fn perform_assert(
        &self,
        args: &[Assignment],
        location: &Location,
        context: &Context,
    ) -> Result<(), EvalError> {
        let arguments = Arguments::evaluate(args, context, self)?;
        let params = [
            Assignment::parameter("condition"),
            Assignment::parameter("message"),
        ];
        let parameters = Parameters::parse(arguments, location, &params, context, self)?;
        if parameters.get("condition").is_some_and(Value::to_bool) {
            return Ok(());
        }

        let condition = args
            .iter()
            .find(|arg| arg.is_positional() || &*arg.name == "condition")
            .and_then(|arg| arg.expr.as_ref())
            .map(ToString::to_string)
            .unwrap_or_default();
        let message = parameters
            .get("message")
            .filter(|value| !value.is_undefined())
            .map(|value| match value {
                Value::String(text) => text.to_string(),
                other => other.to_echo_string(),
            });
        Err(self.raise(
            errors::assertion_failed(&condition, message.as_deref()),
            location,
        ))
    }
}
