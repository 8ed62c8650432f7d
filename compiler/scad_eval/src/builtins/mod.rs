//! Builtin functions and the builtin module registry.
//!
//! The builtin context at the root of every scope chain resolves names
//! through a [`BuiltinRegistry`]. Functions are plain `fn` pointers that
//! receive the unevaluated call; most of them evaluate their arguments
//! right away and check count and types with [`check_count`] and
//! [`check_types`], warning and returning `undef` on mismatch.
//!
//! Builtin modules are only names here. Whoever turns module calls into
//! geometry registers them and interprets the returned handles.

mod list;
mod math;
mod modules;
mod random;
mod search;
mod text;
mod timers;
mod trig;
mod types;

use std::rc::Rc;

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use scad_ir::{Assignment, Location};

use crate::context::Context;
use crate::diagnostics::MessageGroup;
use crate::errors::{EvalError, EvalResult};
use crate::exec::{Arguments, Evaluator};
use crate::session::EvaluationSession;
use crate::value::{Value, ValueType};

bitflags! {
    /// Availability of a builtin.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct BuiltinFlags: u8 {
        /// Resolvable by default.
        const ENABLED = 1 << 0;
        /// Resolvable only with experimental features switched on.
        const EXPERIMENTAL = 1 << 1;
    }
}

impl BuiltinFlags {
    /// Whether an entry with these flags resolves.
    pub fn is_available(self, experimental: bool) -> bool {
        if self.contains(BuiltinFlags::EXPERIMENTAL) {
            experimental
        } else {
            self.contains(BuiltinFlags::ENABLED)
        }
    }
}

/// A call of a builtin function, before argument evaluation.
pub struct BuiltinCall<'a> {
    pub session: &'a EvaluationSession,
    /// Context the call expression is evaluated in.
    pub context: &'a Context,
    pub name: &'static str,
    pub args: &'a [Assignment],
    pub location: &'a Location,
}

impl BuiltinCall<'_> {
    /// Evaluate every argument in the calling context.
    pub fn arguments(&self) -> Result<Arguments, EvalError> {
        Arguments::evaluate(self.args, self.context, &Evaluator::new(self.session))
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.session
            .log(MessageGroup::Warning, self.location.clone(), text);
    }
}

/// Signature of every builtin function.
pub type BuiltinFn = fn(&BuiltinCall<'_>) -> EvalResult;

/// A registered builtin function.
#[derive(Copy, Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
    pub flags: BuiltinFlags,
}

impl BuiltinFunction {
    pub fn call(&self, call: &BuiltinCall<'_>) -> EvalResult {
        (self.func)(call)
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A registered builtin module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinModule {
    pub name: Rc<str>,
    pub flags: BuiltinFlags,
}

/// Name tables consulted by the builtin context.
#[derive(Default)]
pub struct BuiltinRegistry {
    functions: FxHashMap<&'static str, BuiltinFunction>,
    modules: FxHashMap<Rc<str>, BuiltinModule>,
}

impl BuiltinRegistry {
    /// Registry without any entries.
    pub fn new() -> Self {
        BuiltinRegistry::default()
    }

    /// Registry with the standard function set.
    pub fn with_defaults() -> Self {
        let mut registry = BuiltinRegistry::new();
        math::register(&mut registry);
        trig::register(&mut registry);
        list::register(&mut registry);
        search::register(&mut registry);
        random::register(&mut registry);
        modules::register(&mut registry);
        text::register(&mut registry);
        types::register(&mut registry);
        timers::register(&mut registry);
        tracing::debug!(
            functions = registry.functions.len(),
            "builtin registry initialized"
        );
        registry
    }

    /// Add or replace a function.
    pub fn register_function(&mut self, name: &'static str, func: BuiltinFn, flags: BuiltinFlags) {
        self.functions
            .insert(name, BuiltinFunction { name, func, flags });
    }

    /// Add or replace a module name.
    pub fn register_module(&mut self, name: impl Into<Rc<str>>, flags: BuiltinFlags) {
        let name = name.into();
        self.modules
            .insert(Rc::clone(&name), BuiltinModule { name, flags });
    }

    /// Function `name`, if registered and available.
    pub fn function(&self, name: &str, experimental: bool) -> Option<BuiltinFunction> {
        self.functions
            .get(name)
            .filter(|f| f.flags.is_available(experimental))
            .copied()
    }

    /// Module `name`, if registered and available.
    pub fn module(&self, name: &str, experimental: bool) -> Option<BuiltinModule> {
        self.modules
            .get(name)
            .filter(|m| m.flags.is_available(experimental))
            .cloned()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

// Argument checks

/// Warn that `call` got `found` arguments where `expected` were wanted.
pub(crate) fn count_mismatch(call: &BuiltinCall<'_>, expected: &str, found: usize) {
    call.warn(format!(
        "{}() number of parameters does not match: expected {expected}, found {found}",
        call.name
    ));
}

/// Warn that the value at `position` has the wrong type.
pub(crate) fn convert_mismatch(
    call: &BuiltinCall<'_>,
    position: &str,
    expected: ValueType,
    found: &Value,
) {
    call.warn(format!(
        "{}() parameter could not be converted: {position}: expected {}, found {} ({})",
        call.name,
        expected.name(),
        found.type_name(),
        found.to_echo_string()
    ));
}

/// `true` if exactly `expected` arguments were passed; warns otherwise.
pub fn check_count(call: &BuiltinCall<'_>, args: &Arguments, expected: usize) -> bool {
    if args.len() == expected {
        return true;
    }
    count_mismatch(call, &expected.to_string(), args.len());
    false
}

/// `true` if the arguments match `expected` in count and type; warns at
/// the first mismatch otherwise.
pub fn check_types(call: &BuiltinCall<'_>, args: &Arguments, expected: &[ValueType]) -> bool {
    if !check_count(call, args, expected.len()) {
        return false;
    }
    for (i, (value, &ty)) in args.values().zip(expected).enumerate() {
        if value.value_type() != ty {
            convert_mismatch(call, &format!("argument {i}"), ty, value);
            return false;
        }
    }
    true
}

/// Numeric value of a count.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_value(n: usize) -> Value {
    Value::Number(n as f64)
}

#[cfg(test)]
mod tests;
