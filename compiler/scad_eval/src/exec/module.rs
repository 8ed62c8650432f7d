//! Binding of module instantiations.
//!
//! Producing geometry is the caller's business. This module resolves the
//! module, binds its arguments and evaluates its body's assignments, then
//! hands back what the caller needs to walk the body. The module's name
//! stays on the session's module stack for as long as the returned
//! [`ModuleCall`] lives, so `parent_module()` sees it while the caller walks
//! the children.

use std::rc::Rc;

use scad_ir::ModuleInstantiation;

use super::{Arguments, Evaluator, Parameters};
use crate::builtins::{count_value, BuiltinModule};
use crate::context::{Children, Context, ContextHandle, ContextKind, InstantiableModule};
use crate::errors::EvalError;
use crate::session::ModuleFrame;
use crate::value::Value;

/// A bound module instantiation.
pub enum ModuleCall<'s> {
    /// A builtin module with its evaluated arguments.
    Builtin {
        module: BuiltinModule,
        arguments: Arguments,
        frame: ModuleFrame<'s>,
    },
    /// A user module's body context: parameters bound, assignments
    /// evaluated, `$children` and `$parent_modules` set.
    User {
        body: ContextHandle<'s>,
        frame: ModuleFrame<'s>,
    },
}

impl<'s> Evaluator<'s> {
    /// Resolve and bind `instantiation` as seen from `context`.
    ///
    /// An unknown module warns and yields `None`.
    pub fn instantiate_module(
        &self,
        instantiation: &ModuleInstantiation,
        context: &Context,
    ) -> Result<Option<ModuleCall<'s>>, EvalError> {
        let Some(module) =
            context.lookup_module(&instantiation.name, &instantiation.location, self.session)?
        else {
            return Ok(None);
        };
        let frame = self.session.push_module(Rc::clone(&instantiation.name));
        let arguments = Arguments::evaluate(&instantiation.args, context, self)?;
        let (defining, module) = match module {
            InstantiableModule::Builtin(module) => {
                return Ok(Some(ModuleCall::Builtin {
                    module,
                    arguments,
                    frame,
                }));
            }
            InstantiableModule::User { context, module } => (context, module),
        };

        tracing::debug!(module = %module.name, "instantiating module");
        let children = Children {
            scope: Rc::clone(&instantiation.children),
            context: context.clone(),
        };
        let child_count = instantiation.children.instantiations().len();
        let body = self.session.new_context(
            &defining,
            ContextKind::Module {
                module: Rc::clone(&module),
                children,
            },
        );
        body.apply_config_variables(context);
        let parameters = Parameters::parse(
            arguments,
            &instantiation.location,
            &module.params,
            &defining,
            self,
        )?;
        body.apply_variables(parameters.frame());
        body.set_variable("$children", count_value(child_count));
        body.set_variable("$parent_modules", count_value(frame.depth()));
        if let Err(mut err) = body.init() {
            let message = format!("call of '{}'", module.name);
            err.trace(self.session, &message, &instantiation.location);
            return Err(err);
        }
        Ok(Some(ModuleCall::User { body, frame }))
    }
}

impl ModuleCall<'_> {
    /// Number of modules on the stack, this one included.
    pub fn depth(&self) -> usize {
        match self {
            ModuleCall::Builtin { frame, .. } | ModuleCall::User { frame, .. } => frame.depth(),
        }
    }

    /// Value bound to `name` in a user module's body context.
    pub fn variable(&self, name: &str) -> Option<Value> {
        match self {
            ModuleCall::Builtin { .. } => None,
            ModuleCall::User { body, .. } => body.frame().lookup_local_variable(name).cloned(),
        }
    }
}
