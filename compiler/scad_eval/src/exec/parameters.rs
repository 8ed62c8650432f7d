//! Argument evaluation and binding to parameters.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use scad_ir::{Assignment, Location};
use smallvec::SmallVec;

use super::Evaluator;
use crate::context::{is_config_variable, Context, ContextFrame};
use crate::diagnostics::MessageGroup;
use crate::errors::EvalError;
use crate::value::Value;

/// One evaluated call argument.
#[derive(Clone, Debug)]
pub struct Argument {
    /// `None` for positional arguments.
    pub name: Option<Rc<str>>,
    pub value: Value,
}

/// Evaluated arguments of a call, in source order.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    args: SmallVec<[Argument; 4]>,
}

impl Arguments {
    /// Evaluate `args` left to right in `context`.
    pub fn evaluate(
        args: &[Assignment],
        context: &Context,
        evaluator: &Evaluator<'_>,
    ) -> Result<Arguments, EvalError> {
        let mut out = SmallVec::with_capacity(args.len());
        for arg in args {
            let value = match &arg.expr {
                Some(expr) => evaluator.eval(expr, context)?,
                None => Value::undefined(),
            };
            let name = (!arg.is_positional()).then(|| Rc::clone(&arg.name));
            out.push(Argument { name, value });
        }
        Ok(Arguments { args: out })
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter()
    }

    /// Argument values, named ones included.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.args.iter().map(|arg| &arg.value)
    }

    pub fn into_values(self) -> impl Iterator<Item = Value> {
        self.args.into_iter().map(|arg| arg.value)
    }

    /// Value of the argument at position `i`.
    pub fn value(&self, i: usize) -> Option<&Value> {
        self.args.get(i).map(|arg| &arg.value)
    }

    /// Argument `i` if it is a number.
    pub fn number(&self, i: usize) -> Option<f64> {
        self.value(i).and_then(Value::as_number)
    }
}

/// `a = 1, 2` with echo-style values.
impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(name) = &arg.name {
                write!(f, "{name} = ")?;
            }
            f.write_str(&arg.value.to_echo_string())?;
        }
        Ok(())
    }
}

/// Arguments bound to the parameters of a function or module.
pub struct Parameters {
    frame: ContextFrame,
}

impl Parameters {
    /// Bind `arguments` to `params`.
    ///
    /// Named arguments bind by name, positional ones fill the parameters
    /// not yet named, in order. Parameters left unbound get their default,
    /// evaluated in `defining` (the context of the definition), or
    /// `undef`. Mismatches warn; the later binding wins.
    pub fn parse(
        arguments: Arguments,
        location: &Location,
        params: &[Assignment],
        defining: &Context,
        evaluator: &Evaluator<'_>,
    ) -> Result<Parameters, EvalError> {
        let session = evaluator.session();
        let warn = |text: String| session.log(MessageGroup::Warning, location.clone(), text);
        let mut frame = ContextFrame::new(session.accounting().clone());

        let mut named: FxHashSet<Rc<str>> = FxHashSet::default();
        let mut next_positional = 0;
        let mut warned_too_many = false;

        for Argument { name, value } in arguments.args {
            let name = match name {
                Some(name) => {
                    if named.contains(&name) {
                        warn(format!("argument '{name}' supplied more than once"));
                    } else if frame.lookup_local_variable(&name).is_some() {
                        warn(format!("argument '{name}' overrides positional argument"));
                    } else if !is_config_variable(&name) && !params.iter().any(|p| p.name == name) {
                        warn(format!("variable '{name}' not specified as parameter"));
                    }
                    named.insert(Rc::clone(&name));
                    name
                }
                None => {
                    let candidate = params[next_positional.min(params.len())..]
                        .iter()
                        .position(|p| !named.contains(&p.name));
                    let Some(offset) = candidate else {
                        next_positional = params.len();
                        if !warned_too_many {
                            warn("Too many unnamed arguments supplied".to_owned());
                            warned_too_many = true;
                        }
                        continue;
                    };
                    let param = &params[next_positional + offset];
                    next_positional += offset + 1;
                    Rc::clone(&param.name)
                }
            };
            frame.set_variable(name, value);
        }

        for param in params {
            if frame.lookup_local_variable(&param.name).is_some() {
                continue;
            }
            let value = match &param.expr {
                Some(default) => evaluator.eval(default, defining)?,
                None => Value::undefined(),
            };
            frame.set_variable(Rc::clone(&param.name), value);
        }
        Ok(Parameters { frame })
    }

    /// Bound value of parameter `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frame.lookup_local_variable(name)
    }

    pub fn frame(&self) -> &ContextFrame {
        &self.frame
    }
}
