//! Stopwatch builtins backed by the session timer registry.
//!
//! Misusing a timer (unknown id, starting twice, stopping a stopped
//! timer) aborts evaluation.

use super::{check_count, check_types, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::diagnostics::MessageGroup;
use crate::errors::{EvalError, EvalResult};
use crate::session::EvaluationSession;
use crate::timers::{TimerError, TimerId};
use crate::value::{Value, ValueType};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    let enabled = BuiltinFlags::ENABLED;
    registry.register_function("timer_new", timer_new, enabled);
    registry.register_function(
        "timer_start",
        |call| with_timer(call, EvaluationSession::timer_start),
        enabled,
    );
    registry.register_function(
        "timer_stop",
        |call| with_timer(call, EvaluationSession::timer_stop),
        enabled,
    );
    registry.register_function(
        "timer_clear",
        |call| with_timer(call, EvaluationSession::timer_clear),
        enabled,
    );
    registry.register_function(
        "timer_delete",
        |call| with_timer(call, EvaluationSession::timer_delete),
        enabled,
    );
    registry.register_function("timer_elapsed", timer_elapsed, enabled);
}

#[allow(clippy::cast_precision_loss)]
fn timer_new(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    if !check_count(call, &args, 0) {
        return Ok(Value::undefined());
    }
    Ok(Value::Number(call.session.timer_new() as f64))
}

/// Timer id passed as the single argument, if it is one.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
fn timer_id(call: &BuiltinCall<'_>) -> Result<Option<TimerId>, EvalError> {
    let args = call.arguments()?;
    if !check_types(call, &args, &[ValueType::Number]) {
        return Ok(None);
    }
    match args.number(0) {
        Some(n) if n >= 0.0 && n.fract() == 0.0 && n <= 2f64.powi(53) => Ok(Some(n as TimerId)),
        Some(n) => {
            call.warn(format!("{}() invalid timer id {n}", call.name));
            Ok(None)
        }
        None => Ok(None),
    }
}

fn fatal(call: &BuiltinCall<'_>, err: TimerError) -> EvalError {
    let err = EvalError::from(err)
        .with_location(call.location.clone())
        .with_trace_depth(call.session.config().trace_depth);
    call.session
        .log(MessageGroup::Error, call.location.clone(), err.message.clone());
    err
}

fn with_timer(
    call: &BuiltinCall<'_>,
    op: fn(&EvaluationSession, TimerId) -> Result<(), TimerError>,
) -> EvalResult {
    let Some(id) = timer_id(call)? else {
        return Ok(Value::undefined());
    };
    op(call.session, id).map_err(|err| fatal(call, err))?;
    Ok(Value::undefined())
}

/// Accumulated seconds, a running interval included.
fn timer_elapsed(call: &BuiltinCall<'_>) -> EvalResult {
    let Some(id) = timer_id(call)? else {
        return Ok(Value::undefined());
    };
    let elapsed = call
        .session
        .timer_elapsed(id)
        .map_err(|err| fatal(call, err))?;
    Ok(Value::Number(elapsed.as_secs_f64()))
}
