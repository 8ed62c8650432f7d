//! Access to the modules being instantiated.

use scad_ir::format_number;

use super::{check_types, BuiltinCall, BuiltinFlags, BuiltinRegistry};
use crate::errors::EvalResult;
use crate::value::{Value, ValueType};

pub(super) fn register(registry: &mut BuiltinRegistry) {
    registry.register_function("parent_module", parent_module, BuiltinFlags::ENABLED);
}

/// `parent_module([n])`: name of the module `n` levels above the innermost
/// one; `n` defaults to 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parent_module(call: &BuiltinCall<'_>) -> EvalResult {
    let args = call.arguments()?;
    let levels = if args.is_empty() {
        1.0
    } else if check_types(call, &args, &[ValueType::Number]) {
        args.number(0).unwrap_or_default().trunc()
    } else {
        return Ok(Value::undefined());
    };

    if levels.is_nan() || levels < 0.0 {
        call.warn(format!(
            "Negative parent module index ({}) not allowed",
            format_number(levels)
        ));
        return Ok(Value::undefined());
    }
    match call.session.parent_module(levels as usize) {
        Some(name) => Ok(Value::string(name)),
        None => {
            call.warn(format!(
                "Parent module index ({}) greater than the number of modules on the stack",
                format_number(levels)
            ));
            Ok(Value::undefined())
        }
    }
}
