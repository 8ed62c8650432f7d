//! Statement blocks and the definitions they hold.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{Assignment, AssignmentList, ParameterList, SharedExpr};
use crate::Location;

/// `function name(params) = body;`
#[derive(Clone, Debug, PartialEq)]
pub struct UserFunction {
    pub name: Rc<str>,
    pub params: ParameterList,
    pub body: SharedExpr,
    pub location: Location,
}

impl UserFunction {
    pub fn new(name: impl Into<Rc<str>>, params: impl Into<ParameterList>, body: SharedExpr) -> Self {
        UserFunction {
            name: name.into(),
            params: params.into(),
            body,
            location: Location::NONE,
        }
    }
}

/// `module name(params) { body }`
#[derive(Clone, Debug, PartialEq)]
pub struct UserModule {
    pub name: Rc<str>,
    pub params: ParameterList,
    pub body: Rc<Scope>,
    pub location: Location,
}

impl UserModule {
    pub fn new(name: impl Into<Rc<str>>, params: impl Into<ParameterList>, body: Scope) -> Self {
        UserModule {
            name: name.into(),
            params: params.into(),
            body: Rc::new(body),
            location: Location::NONE,
        }
    }
}

/// `name(args) { children }` inside a block.
///
/// Instantiating geometry is up to the consumer of the evaluator; the
/// runtime only resolves the module and binds its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleInstantiation {
    pub name: Rc<str>,
    pub args: AssignmentList,
    pub children: Rc<Scope>,
    pub location: Location,
}

impl ModuleInstantiation {
    pub fn new(name: impl Into<Rc<str>>, args: AssignmentList, children: Scope) -> Self {
        ModuleInstantiation {
            name: name.into(),
            args,
            children: Rc::new(children),
            location: Location::NONE,
        }
    }
}

/// A statement block: the body of a file, a module, or a namespace.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
    assignments: AssignmentList,
    functions: FxHashMap<Rc<str>, Rc<UserFunction>>,
    modules: FxHashMap<Rc<str>, Rc<UserModule>>,
    usings: Vec<Rc<str>>,
    instantiations: Vec<Rc<ModuleInstantiation>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Add `name = expr;`.
    ///
    /// Assigning a name twice keeps the first position but evaluates the
    /// last expression, remembering where the override happened.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        if let Some(existing) = self
            .assignments
            .iter_mut()
            .find(|a| a.name == assignment.name)
        {
            existing.expr = assignment.expr;
            existing.overwrite_location = Some(assignment.location);
        } else {
            self.assignments.push(assignment);
        }
    }

    pub fn add_function(&mut self, function: UserFunction) {
        self.functions
            .insert(Rc::clone(&function.name), Rc::new(function));
    }

    pub fn add_module(&mut self, module: UserModule) {
        self.modules.insert(Rc::clone(&module.name), Rc::new(module));
    }

    /// Make the members of namespace `name` visible in this block.
    pub fn add_using(&mut self, name: impl Into<Rc<str>>) {
        self.usings.push(name.into());
    }

    pub fn add_instantiation(&mut self, instantiation: ModuleInstantiation) {
        self.instantiations.push(Rc::new(instantiation));
    }

    /// Builder-style [`Scope::add_assignment`].
    #[must_use]
    pub fn with_assignment(mut self, name: impl Into<Rc<str>>, expr: SharedExpr) -> Self {
        self.add_assignment(Assignment::new(name, expr));
        self
    }

    /// Builder-style [`Scope::add_function`].
    #[must_use]
    pub fn with_function(mut self, function: UserFunction) -> Self {
        self.add_function(function);
        self
    }

    /// Builder-style [`Scope::add_module`].
    #[must_use]
    pub fn with_module(mut self, module: UserModule) -> Self {
        self.add_module(module);
        self
    }

    /// Builder-style [`Scope::add_using`].
    #[must_use]
    pub fn with_using(mut self, name: impl Into<Rc<str>>) -> Self {
        self.add_using(name);
        self
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn usings(&self) -> &[Rc<str>] {
        &self.usings
    }

    pub fn instantiations(&self) -> &[Rc<ModuleInstantiation>] {
        &self.instantiations
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Rc<UserFunction>> {
        self.functions.get(name)
    }

    pub fn lookup_module(&self, name: &str) -> Option<&Rc<UserModule>> {
        self.modules.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
            && self.functions.is_empty()
            && self.modules.is_empty()
            && self.instantiations.is_empty()
    }
}
