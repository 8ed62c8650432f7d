//! Per-run evaluation state.
//!
//! One [`EvaluationSession`] exists per top-level evaluation. It owns the
//! builtin root context, the stack of active frames used for `$` variable
//! lookups, the names of the modules being instantiated, the namespace and
//! source-file caches, heap accounting with the memory manager, the timer
//! registry, the random number generator, and the diagnostics sink.
//!
//! Everything is single-threaded and uses interior mutability; the session
//! is passed by shared reference through every evaluation call.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use scad_ir::{Location, Scope, SourceFile};

use crate::accounting::HeapSizeAccounting;
use crate::builtins::BuiltinRegistry;
use crate::config::EvalConfig;
use crate::context::{CallableFunction, Context, ContextHandle, ContextKind, NamespaceMember};
use crate::diagnostics::{Message, MessageGroup};
use crate::errors::{self, EvalError};
use crate::memory::ContextMemoryManager;
use crate::print_handler::{handler_for, SharedPrintHandler};
use crate::timers::{TimerError, TimerId, TimerRegistry};
use crate::value::Value;

struct Namespace {
    scope: Rc<Scope>,
    context: Option<Context>,
    initializing: bool,
}

/// Builder for [`EvaluationSession`].
pub struct SessionBuilder {
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
    builtins: Option<BuiltinRegistry>,
}

impl SessionBuilder {
    fn new() -> Self {
        SessionBuilder {
            config: EvalConfig::default(),
            print_handler: None,
            builtins: None,
        }
    }

    /// Set the limits and switches.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the diagnostics sink. Overrides `config.print_target`.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Replace the default builtin registry.
    #[must_use]
    pub fn builtins(mut self, registry: BuiltinRegistry) -> Self {
        self.builtins = Some(registry);
        self
    }

    pub fn build(self) -> EvaluationSession {
        let accounting = HeapSizeAccounting::new();
        let print_handler = self
            .print_handler
            .unwrap_or_else(|| handler_for(self.config.print_target));
        let builtins = Rc::new(self.builtins.unwrap_or_else(BuiltinRegistry::with_defaults));

        let builtin_context = Context::new(
            None,
            ContextKind::Builtin(Rc::clone(&builtins)),
            accounting.clone(),
        );
        builtin_context.set_variable("PI", Value::Number(std::f64::consts::PI));
        builtin_context.set_variable("$fn", Value::Number(0.0));
        builtin_context.set_variable("$fa", Value::Number(12.0));
        builtin_context.set_variable("$fs", Value::Number(2.0));
        builtin_context.set_variable("$t", Value::Number(0.0));
        builtin_context.set_variable("$preview", Value::Bool(false));

        let memory = ContextMemoryManager::new(accounting.clone(), self.config.gc_initial_threshold);
        let rng = self
            .config
            .random_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        EvaluationSession {
            stack: RefCell::new(vec![builtin_context.clone()]),
            module_names: RefCell::new(Vec::new()),
            builtin_context,
            builtins,
            namespaces: RefCell::new(FxHashMap::default()),
            source_files: RefCell::new(FxHashMap::default()),
            timers: RefCell::new(TimerRegistry::new()),
            rng: RefCell::new(rng),
            print_handler,
            pending_error: RefCell::new(None),
            has_pending_error: Cell::new(false),
            config: self.config,
            accounting,
            memory: RefCell::new(memory),
        }
    }
}

/// State shared by everything evaluated in one run.
pub struct EvaluationSession {
    config: EvalConfig,
    builtins: Rc<BuiltinRegistry>,
    builtin_context: Context,
    /// Frames of live context handles, innermost last. Index 0 is the
    /// builtin context.
    stack: RefCell<Vec<Context>>,
    /// Modules being instantiated, innermost last.
    module_names: RefCell<Vec<Rc<str>>>,
    namespaces: RefCell<FxHashMap<Rc<str>, Namespace>>,
    source_files: RefCell<FxHashMap<Rc<str>, Rc<SourceFile>>>,
    timers: RefCell<TimerRegistry>,
    rng: RefCell<StdRng>,
    print_handler: SharedPrintHandler,
    pending_error: RefCell<Option<EvalError>>,
    has_pending_error: Cell<bool>,
    accounting: HeapSizeAccounting,
    // Dropped last: its final pass runs once every other holder is gone.
    memory: RefCell<ContextMemoryManager>,
}

impl EvaluationSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Session with default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn accounting(&self) -> &HeapSizeAccounting {
        &self.accounting
    }

    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Root of every context chain.
    pub fn builtin_context(&self) -> &Context {
        &self.builtin_context
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Captured diagnostics; empty unless printing to a buffer.
    pub fn output(&self) -> String {
        self.print_handler.get_output()
    }

    // Diagnostics

    /// Report a message through the sink.
    ///
    /// With "stop on first warning" enabled a warning also becomes the
    /// pending error that the evaluator raises at its next step.
    pub fn log(&self, group: MessageGroup, location: Location, text: impl Into<String>) {
        let message = Message::new(group, text, location);
        message.emit_event();
        self.print_handler.println(&message.to_string());

        if group.is_warning() && self.config.stop_on_first_warning && !self.has_pending_error.get() {
            let err = errors::hard_warning(&message.text)
                .with_location(message.location)
                .with_trace_depth(self.config.trace_depth);
            *self.pending_error.borrow_mut() = Some(err);
            self.has_pending_error.set(true);
        }
    }

    /// Escalated warning waiting to be raised, if any.
    #[inline]
    pub fn take_pending_error(&self) -> Option<EvalError> {
        if !self.has_pending_error.get() {
            return None;
        }
        self.has_pending_error.set(false);
        self.pending_error.borrow_mut().take()
    }

    // Frame stack

    /// Create a child context of `parent` and push it on the frame stack.
    pub fn new_context(&self, parent: &Context, kind: ContextKind) -> ContextHandle<'_> {
        let context = Context::new(Some(parent.clone()), kind, self.accounting.clone());
        self.push_frame(context)
    }

    /// Push `context` on the frame stack. The returned handle pops it again.
    pub fn push_frame(&self, context: Context) -> ContextHandle<'_> {
        let mut stack = self.stack.borrow_mut();
        let index = stack.len();
        stack.push(context.clone());
        drop(stack);
        ContextHandle::new(self, context, index)
    }

    /// Number of frames on the stack, the builtin frame included.
    pub fn frame_depth(&self) -> usize {
        self.stack.borrow().len()
    }

    pub(crate) fn pop_frames(&self, index: usize) {
        let popped = {
            let mut stack = self.stack.borrow_mut();
            if index < stack.len() {
                stack.split_off(index)
            } else {
                Vec::new()
            }
        };
        drop(popped);
    }

    pub(crate) fn replace_frame(&self, index: usize, context: &Context) {
        self.pop_frames(index);
        self.stack.borrow_mut().push(context.clone());
    }

    // Module names

    /// Record that module `name` is being instantiated until the returned
    /// frame drops.
    pub fn push_module(&self, name: Rc<str>) -> ModuleFrame<'_> {
        let mut names = self.module_names.borrow_mut();
        let index = names.len();
        names.push(name);
        ModuleFrame {
            session: self,
            index,
        }
    }

    /// Number of modules being instantiated.
    pub fn module_depth(&self) -> usize {
        self.module_names.borrow().len()
    }

    /// Name of the module `levels` up the instantiation stack; 0 is the
    /// innermost.
    pub fn parent_module(&self, levels: usize) -> Option<Rc<str>> {
        let names = self.module_names.borrow();
        let index = names.len().checked_sub(levels)?.checked_sub(1)?;
        names.get(index).cloned()
    }

    /// Hand a released context to the memory manager.
    pub(crate) fn release_context(&self, context: &Context) {
        if let Ok(mut memory) = self.memory.try_borrow_mut() {
            memory.add_context(context);
        }
    }

    /// `$` variable from the innermost frame that binds it, silently.
    pub fn try_lookup_special_variable(&self, name: &str) -> Option<Value> {
        let stack = self.stack.borrow();
        stack
            .iter()
            .rev()
            .find_map(|context| context.frame().lookup_local_variable(name).cloned())
    }

    /// `$` variable from the innermost frame that binds it; a miss warns.
    pub fn lookup_special_variable(&self, name: &str, location: &Location) -> Value {
        if let Some(value) = self.try_lookup_special_variable(name) {
            return value;
        }
        self.log(
            MessageGroup::Warning,
            location.clone(),
            format!("Ignoring unknown variable '{name}'"),
        );
        Value::undefined()
    }

    /// Function value bound to a `$` variable; a miss warns.
    pub fn lookup_special_function(&self, name: &str, location: &Location) -> Option<CallableFunction> {
        match self.try_lookup_special_variable(name) {
            Some(Value::Function(function)) => Some(CallableFunction::Value(function)),
            _ => {
                self.log(
                    MessageGroup::Warning,
                    location.clone(),
                    format!("Ignoring unknown function '{name}'"),
                );
                None
            }
        }
    }

    // Namespaces

    /// Register the block of namespace `name`. Its context is built on
    /// first lookup.
    pub fn register_namespace(&self, name: impl Into<Rc<str>>, scope: Scope) {
        let old = self.namespaces.borrow_mut().insert(
            name.into(),
            Namespace {
                scope: Rc::new(scope),
                context: None,
                initializing: false,
            },
        );
        drop(old);
    }

    /// Resolve `member` in namespace `namespace`.
    ///
    /// Unknown namespaces resolve nothing. A namespace referring to itself
    /// while its context is being built resolves nothing either.
    pub fn lookup_namespace<T: NamespaceMember>(
        &self,
        namespace: &str,
        member: &str,
    ) -> Result<Option<T>, EvalError> {
        let Some(context) = self.namespace_context(namespace)? else {
            return Ok(None);
        };
        T::lookup_in_namespace(&context, member, self)
    }

    fn namespace_context(&self, name: &str) -> Result<Option<Context>, EvalError> {
        let scope = {
            let mut namespaces = self.namespaces.borrow_mut();
            let Some(namespace) = namespaces.get_mut(name) else {
                return Ok(None);
            };
            if let Some(context) = &namespace.context {
                return Ok(Some(context.clone()));
            }
            if namespace.initializing {
                return Ok(None);
            }
            namespace.initializing = true;
            Rc::clone(&namespace.scope)
        };

        tracing::debug!(namespace = name, "building namespace context");
        let handle = self.new_context(&self.builtin_context, ContextKind::Scope(scope));
        let result = handle.init();
        let context = handle.context().clone();
        drop(handle);

        if let Some(namespace) = self.namespaces.borrow_mut().get_mut(name) {
            namespace.initializing = false;
            if result.is_ok() {
                namespace.context = Some(context.clone());
            }
        }
        result.map(|()| Some(context))
    }

    // Source files

    /// Add `file` to the cache, replacing an earlier file with its path.
    pub fn register_source_file(&self, file: SourceFile) -> Rc<SourceFile> {
        let file = Rc::new(file);
        self.source_files
            .borrow_mut()
            .insert(Rc::clone(&file.path), Rc::clone(&file));
        file
    }

    pub fn lookup_source_file(&self, path: &str) -> Option<Rc<SourceFile>> {
        self.source_files.borrow().get(path).cloned()
    }

    /// Register `file` and evaluate its top-level assignments in a fresh
    /// file context under the builtin context.
    pub fn file_context(&self, file: SourceFile) -> Result<ContextHandle<'_>, EvalError> {
        let file = self.register_source_file(file);
        let handle = self.new_context(&self.builtin_context, ContextKind::File(file));
        handle.init()?;
        Ok(handle)
    }

    // Memory

    /// Run a collection pass now; returns the number of contexts reclaimed.
    pub fn collect_garbage(&self) -> usize {
        self.memory.borrow_mut().collect()
    }

    /// Live contexts in the collector's pool.
    pub fn managed_context_count(&self) -> usize {
        self.memory.borrow().managed_count()
    }

    /// Heap size that triggers the next collection pass.
    pub fn next_collection_size(&self) -> usize {
        self.memory.borrow().next_collection_size()
    }

    // Random numbers

    /// Restart the generator from `seed`.
    pub fn reseed_rng(&self, seed: u64) {
        *self.rng.borrow_mut() = StdRng::seed_from_u64(seed);
    }

    pub(crate) fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        f(&mut self.rng.borrow_mut())
    }

    // Timers

    pub fn timer_new(&self) -> TimerId {
        self.timers.borrow_mut().create()
    }

    pub fn timer_start(&self, id: TimerId) -> Result<(), TimerError> {
        self.timers.borrow_mut().start(id)
    }

    pub fn timer_stop(&self, id: TimerId) -> Result<(), TimerError> {
        self.timers.borrow_mut().stop(id)
    }

    pub fn timer_clear(&self, id: TimerId) -> Result<(), TimerError> {
        self.timers.borrow_mut().clear(id)
    }

    pub fn timer_elapsed(&self, id: TimerId) -> Result<Duration, TimerError> {
        self.timers.borrow().elapsed(id)
    }

    pub fn timer_delete(&self, id: TimerId) -> Result<(), TimerError> {
        self.timers.borrow_mut().delete(id)
    }
}

/// Entry of the module name stack; removes itself, and anything pushed
/// after it, on drop.
pub struct ModuleFrame<'s> {
    session: &'s EvaluationSession,
    index: usize,
}

impl ModuleFrame<'_> {
    /// Depth of the stack with this module on top.
    pub fn depth(&self) -> usize {
        self.index + 1
    }
}

impl Drop for ModuleFrame<'_> {
    fn drop(&mut self) {
        self.session.module_names.borrow_mut().truncate(self.index);
    }
}

impl Default for EvaluationSession {
    fn default() -> Self {
        Self::new()
    }
}
