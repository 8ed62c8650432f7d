//! Scope chain.
//!
//! A [`Context`] is a node in a parent-linked chain of scopes. It owns a
//! [`ContextFrame`] of variables and, depending on its [`ContextKind`],
//! resolves functions and modules defined by a statement block, a module
//! body, a source file and its `use`d libraries, or the builtin registry
//! at the root.
//!
//! Contexts are shared by every closure and nested scope that still needs
//! them. Closures stored back into their own context form reference
//! cycles; see [`crate::memory`] for how those are reclaimed.
//!
//! Special (`$`) variables bypass the parent chain and resolve through the
//! session's frame stack instead (dynamic scoping).

mod frame;
mod handle;

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use scad_ir::{Location, Scope, SourceFile, UserFunction, UserModule};

use crate::accounting::HeapSizeAccounting;
use crate::builtins::{BuiltinFunction, BuiltinModule, BuiltinRegistry};
use crate::diagnostics::MessageGroup;
use crate::errors::EvalError;
use crate::exec::Evaluator;
use crate::session::EvaluationSession;
use crate::value::{FunctionPtr, Value};

pub use frame::{is_config_variable, ContextFrame};
pub use handle::ContextHandle;

/// The caller's child instantiations of a module invocation, together
/// with the context they have to be evaluated in.
#[derive(Clone)]
pub struct Children {
    pub scope: Rc<Scope>,
    pub context: Context,
}

/// What a context resolves beyond its own variables.
pub enum ContextKind {
    /// Root of every chain: builtin functions and modules.
    Builtin(Rc<BuiltinRegistry>),
    /// Variables only (`let`, call bodies, comprehension iterations).
    Plain,
    /// A statement block with its own definitions and `use`d namespaces.
    Scope(Rc<Scope>),
    /// A module invocation: the module body plus the caller's children.
    Module {
        module: Rc<UserModule>,
        children: Children,
    },
    /// The top-level block of a source file and its `use`d libraries.
    File(Rc<SourceFile>),
}

impl ContextKind {
    /// Statement block evaluated by [`Context::init`], if any.
    pub fn scope(&self) -> Option<&Rc<Scope>> {
        match self {
            ContextKind::Scope(scope) => Some(scope),
            ContextKind::Module { module, .. } => Some(&module.body),
            ContextKind::File(file) => Some(&file.scope),
            ContextKind::Builtin(_) | ContextKind::Plain => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ContextKind::Builtin(_) => "builtin",
            ContextKind::Plain => "plain",
            ContextKind::Scope(_) => "scope",
            ContextKind::Module { .. } => "module",
            ContextKind::File(_) => "file",
        }
    }
}

/// Shared state of a context.
pub struct ContextData {
    pub(crate) frame: RefCell<ContextFrame>,
    pub(crate) parent: RefCell<Option<Context>>,
    pub(crate) kind: ContextKind,
    accounting: HeapSizeAccounting,
    /// Set once the memory manager counted this context in the heap size.
    accounted: Cell<bool>,
}

impl Drop for ContextData {
    fn drop(&mut self) {
        if self.accounted.get() {
            self.accounting.remove_context();
        }
        // Long parent chains and nested closures drop recursively.
        let parent = self.parent.get_mut().take();
        let values = self.frame.get_mut().take_values();
        scad_stack::ensure_sufficient_stack(move || {
            drop(values);
            drop(parent);
        });
    }
}

/// A shared handle to a scope.
#[derive(Clone)]
pub struct Context(pub(crate) Rc<ContextData>);

/// Non-owning handle, used by the memory manager's pool.
#[derive(Clone)]
pub struct WeakContext(Weak<ContextData>);

impl WeakContext {
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// A function resolved by name.
#[derive(Clone)]
pub enum CallableFunction {
    Builtin(BuiltinFunction),
    /// `function f(..) = ..;` together with its defining context.
    User {
        context: Context,
        function: Rc<UserFunction>,
    },
    /// A variable holding a function value.
    Value(FunctionPtr),
}

/// A module resolved by name.
#[derive(Clone)]
pub enum InstantiableModule {
    Builtin(BuiltinModule),
    User { context: Context, module: Rc<UserModule> },
}

/// Something that can be looked up as a member of a namespace.
pub trait NamespaceMember: Sized {
    /// Resolve `name` in the namespace context `context` without walking
    /// its parents.
    fn lookup_in_namespace(
        context: &Context,
        name: &str,
        session: &EvaluationSession,
    ) -> Result<Option<Self>, EvalError>;
}

impl NamespaceMember for Value {
    fn lookup_in_namespace(
        context: &Context,
        name: &str,
        _session: &EvaluationSession,
    ) -> Result<Option<Self>, EvalError> {
        Ok(context.frame().lookup_local_variable(name).cloned())
    }
}

impl NamespaceMember for CallableFunction {
    fn lookup_in_namespace(
        context: &Context,
        name: &str,
        _session: &EvaluationSession,
    ) -> Result<Option<Self>, EvalError> {
        if let Some(function) = context.kind().scope().and_then(|s| s.lookup_function(name)) {
            return Ok(Some(CallableFunction::User {
                context: context.clone(),
                function: Rc::clone(function),
            }));
        }
        Ok(context.lookup_function_value(name))
    }
}

impl NamespaceMember for InstantiableModule {
    fn lookup_in_namespace(
        context: &Context,
        name: &str,
        _session: &EvaluationSession,
    ) -> Result<Option<Self>, EvalError> {
        Ok(context
            .kind()
            .scope()
            .and_then(|s| s.lookup_module(name))
            .map(|module| InstantiableModule::User {
                context: context.clone(),
                module: Rc::clone(module),
            }))
    }
}

impl Context {
    /// Create a context. Callers go through
    /// [`EvaluationSession::new_context`] so the context is pushed on the
    /// frame stack and handed to the memory manager when released.
    pub(crate) fn new(
        parent: Option<Context>,
        kind: ContextKind,
        accounting: HeapSizeAccounting,
    ) -> Context {
        tracing::trace!(kind = kind.name(), "new context");
        Context(Rc::new(ContextData {
            frame: RefCell::new(ContextFrame::new(accounting.clone())),
            parent: RefCell::new(parent),
            kind,
            accounting,
            accounted: Cell::new(false),
        }))
    }

    pub fn kind(&self) -> &ContextKind {
        &self.0.kind
    }

    pub fn parent(&self) -> Option<Context> {
        self.0.parent.borrow().clone()
    }

    /// Re-link this context. Only the C-style `for` comprehension does
    /// this, to keep its iteration chain from growing.
    pub fn set_parent(&self, parent: Option<Context>) {
        let old = self.0.parent.replace(parent);
        drop(old);
    }

    /// Read access to the variables. Do not hold across evaluation.
    pub fn frame(&self) -> Ref<'_, ContextFrame> {
        self.0.frame.borrow()
    }

    /// Bind `name` in this context only.
    pub fn set_variable(&self, name: impl Into<Rc<str>>, value: Value) {
        self.0.frame.borrow_mut().set_variable(name, value);
    }

    /// Copy every binding of `other`.
    pub fn apply_variables(&self, other: &ContextFrame) {
        self.0.frame.borrow_mut().apply_variables(other);
    }

    /// Copy only the `$` bindings of `other`.
    pub fn apply_config_variables(&self, other: &Context) {
        if self.ptr_eq(other) {
            return;
        }
        let source = other.frame();
        self.0.frame.borrow_mut().apply_config_variables(&source);
    }

    /// Drop every binding; returns how many were removed.
    pub fn clear(&self) -> usize {
        let values = self.0.frame.borrow_mut().take_values();
        let removed = values.len();
        drop(values);
        removed
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    /// Number of strong holders, this handle included.
    pub fn holder_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Mark as counted in the heap size. Returns `false` if it already was.
    pub(crate) fn mark_accounted(&self) -> bool {
        !self.0.accounted.replace(true)
    }

    /// Evaluate the assignments of this context's statement block, in
    /// order.
    pub fn init(&self, session: &EvaluationSession) -> Result<(), EvalError> {
        let Some(scope) = self.kind().scope().cloned() else {
            return Ok(());
        };
        let evaluator = Evaluator::new(session);
        for assignment in scope.assignments() {
            let Some(expr) = &assignment.expr else {
                continue;
            };
            if expr.is_literal() && self.frame().lookup_local_variable(&assignment.name).is_some() {
                session.log(
                    MessageGroup::Warning,
                    assignment.location.clone(),
                    format!("Parameter '{}' is overwritten with a literal", assignment.name),
                );
            }
            match evaluator.eval(expr, self) {
                Ok(value) => self.set_variable(Rc::clone(&assignment.name), value),
                Err(mut err) => {
                    if let Some(overwrite) = &assignment.overwrite_location {
                        if err.trace_depth > 0 {
                            session.log(
                                MessageGroup::Trace,
                                assignment.location.clone(),
                                format!(
                                    "overwritten assignment to '{}' (this is where the assignment is evaluated)",
                                    assignment.name
                                ),
                            );
                            session.log(
                                MessageGroup::Trace,
                                overwrite.clone(),
                                format!("overwriting assignment to '{}'", assignment.name),
                            );
                            err.trace_depth -= 1;
                        }
                    } else {
                        let message = format!("assignment to '{}'", assignment.name);
                        err.trace(session, &message, &assignment.location);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    // Variables

    /// Binding of `name` in this context, including `use`d namespaces of
    /// scope contexts. Parents are not consulted.
    pub fn lookup_local_variable(
        &self,
        name: &str,
        session: &EvaluationSession,
    ) -> Result<Option<Value>, EvalError> {
        if let Some(value) = self.frame().lookup_local_variable(name) {
            return Ok(Some(value.clone()));
        }
        if let Some(scope) = self.kind().scope() {
            for namespace in scope.usings() {
                if let Some(value) = session.lookup_namespace::<Value>(namespace, name)? {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }

    /// Resolve a variable without reporting a miss.
    pub fn try_lookup_variable(
        &self,
        name: &str,
        session: &EvaluationSession,
    ) -> Result<Option<Value>, EvalError> {
        if is_config_variable(name) {
            return Ok(session.try_lookup_special_variable(name));
        }
        let mut current = Some(self.clone());
        while let Some(context) = current {
            if let Some(value) = context.lookup_local_variable(name, session)? {
                return Ok(Some(value));
            }
            current = context.parent();
        }
        Ok(None)
    }

    /// Resolve a variable; a miss warns and yields `undef`.
    pub fn lookup_variable(
        &self,
        name: &str,
        location: &Location,
        session: &EvaluationSession,
    ) -> Result<Value, EvalError> {
        if is_config_variable(name) {
            return Ok(session.lookup_special_variable(name, location));
        }
        match self.try_lookup_variable(name, session)? {
            Some(value) => Ok(value),
            None => {
                session.log(
                    MessageGroup::Warning,
                    location.clone(),
                    format!("Ignoring unknown variable '{name}'"),
                );
                Ok(Value::undefined())
            }
        }
    }

    // Functions

    fn lookup_function_value(&self, name: &str) -> Option<CallableFunction> {
        match self.frame().lookup_local_variable(name) {
            Some(Value::Function(function)) => Some(CallableFunction::Value(function.clone())),
            _ => None,
        }
    }

    /// Function named `name` defined by this context itself.
    pub fn lookup_local_function(
        &self,
        name: &str,
        session: &EvaluationSession,
    ) -> Result<Option<CallableFunction>, EvalError> {
        if let ContextKind::Builtin(registry) = self.kind() {
            let experimental = session.config().experimental_features;
            return Ok(registry
                .function(name, experimental)
                .map(CallableFunction::Builtin));
        }
        let Some(scope) = self.kind().scope() else {
            return Ok(self.lookup_function_value(name));
        };
        if let Some(function) = scope.lookup_function(name) {
            return Ok(Some(CallableFunction::User {
                context: self.clone(),
                function: Rc::clone(function),
            }));
        }
        // `f = function() ..;` shadows a namespace's `function f()`.
        if let Some(function) = self.lookup_function_value(name) {
            return Ok(Some(function));
        }
        for namespace in scope.usings() {
            if let Some(function) = session.lookup_namespace::<CallableFunction>(namespace, name)? {
                return Ok(Some(function));
            }
        }
        if let ContextKind::File(file) = self.kind() {
            return lookup_function_from_uses(file, name, session);
        }
        Ok(None)
    }

    /// Resolve a function up the parent chain; a miss warns.
    pub fn lookup_function(
        &self,
        name: &str,
        location: &Location,
        session: &EvaluationSession,
    ) -> Result<Option<CallableFunction>, EvalError> {
        if is_config_variable(name) {
            return Ok(session.lookup_special_function(name, location));
        }
        let mut current = Some(self.clone());
        while let Some(context) = current {
            if let Some(function) = context.lookup_local_function(name, session)? {
                return Ok(Some(function));
            }
            current = context.parent();
        }
        session.log(
            MessageGroup::Warning,
            location.clone(),
            format!("Ignoring unknown function '{name}'"),
        );
        Ok(None)
    }

    // Modules

    /// Module named `name` defined by this context itself.
    pub fn lookup_local_module(
        &self,
        name: &str,
        session: &EvaluationSession,
    ) -> Result<Option<InstantiableModule>, EvalError> {
        if let ContextKind::Builtin(registry) = self.kind() {
            let experimental = session.config().experimental_features;
            return Ok(registry
                .module(name, experimental)
                .map(InstantiableModule::Builtin));
        }
        let Some(scope) = self.kind().scope() else {
            return Ok(None);
        };
        if let Some(module) = scope.lookup_module(name) {
            return Ok(Some(InstantiableModule::User {
                context: self.clone(),
                module: Rc::clone(module),
            }));
        }
        for namespace in scope.usings() {
            if let Some(module) = session.lookup_namespace::<InstantiableModule>(namespace, name)? {
                return Ok(Some(module));
            }
        }
        if let ContextKind::File(file) = self.kind() {
            return lookup_module_from_uses(file, name, session);
        }
        Ok(None)
    }

    /// Resolve a module up the parent chain; a miss warns.
    pub fn lookup_module(
        &self,
        name: &str,
        location: &Location,
        session: &EvaluationSession,
    ) -> Result<Option<InstantiableModule>, EvalError> {
        let mut current = Some(self.clone());
        while let Some(context) = current {
            if let Some(module) = context.lookup_local_module(name, session)? {
                return Ok(Some(module));
            }
            current = context.parent();
        }
        session.log(
            MessageGroup::Warning,
            location.clone(),
            format!("Ignoring unknown module '{name}'"),
        );
        Ok(None)
    }

    /// Contexts this one keeps alive directly: its parent and, for module
    /// invocations, the children's context.
    pub(crate) fn referenced_contexts(&self) -> Vec<Context> {
        let mut out = Vec::with_capacity(2);
        if let Some(parent) = self.parent() {
            out.push(parent);
        }
        if let ContextKind::Module { children, .. } = self.kind() {
            out.push(children.context.clone());
        }
        out
    }
}

/// Fresh, initialized context for a `use`d library, parented to the
/// builtin context.
fn library_context(
    library: &Rc<SourceFile>,
    session: &EvaluationSession,
) -> Result<Context, EvalError> {
    let handle = session.new_context(session.builtin_context(), ContextKind::File(Rc::clone(library)));
    handle.init()?;
    Ok(handle.context().clone())
}

fn lookup_function_from_uses(
    file: &SourceFile,
    name: &str,
    session: &EvaluationSession,
) -> Result<Option<CallableFunction>, EvalError> {
    for path in file.used_libraries_newest_first() {
        // Libraries that were never registered are skipped.
        let Some(library) = session.lookup_source_file(path) else {
            continue;
        };
        if let Some(function) = library.scope.lookup_function(name) {
            let function = Rc::clone(function);
            let context = library_context(&library, session)?;
            return Ok(Some(CallableFunction::User { context, function }));
        }
    }
    Ok(None)
}

fn lookup_module_from_uses(
    file: &SourceFile,
    name: &str,
    session: &EvaluationSession,
) -> Result<Option<InstantiableModule>, EvalError> {
    for path in file.used_libraries_newest_first() {
        let Some(library) = session.lookup_source_file(path) else {
            continue;
        };
        if let Some(module) = library.scope.lookup_module(name) {
            let module = Rc::clone(module);
            let context = library_context(&library, session)?;
            return Ok(Some(InstantiableModule::User { context, module }));
        }
    }
    Ok(None)
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.frame.try_borrow();
        let mut out = f.debug_struct("Context");
        out.field("kind", &self.kind().name());
        match frame {
            Ok(frame) => out.field("variables", &frame.len()),
            Err(_) => out.field("variables", &"<borrowed>"),
        };
        out.finish_non_exhaustive()
    }
}
