//! Function values (closures).

use std::fmt;
use std::rc::Rc;

use scad_ir::{DisplayList, ParameterList, SharedExpr};

use crate::context::Context;

/// A function literal together with the context it was evaluated in.
///
/// The captured context keeps every enclosing binding alive. A closure
/// stored back into a variable of its own context forms a cycle; the
/// memory manager is what eventually reclaims it.
pub struct FunctionType {
    pub context: Context,
    pub params: ParameterList,
    pub body: SharedExpr,
}

impl FunctionType {
    pub fn new(context: Context, params: ParameterList, body: SharedExpr) -> Self {
        FunctionType {
            context,
            params,
            body,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function({}) {}", DisplayList(&self.params), self.body)
    }
}

/// Shared handle to a [`FunctionType`]. Equality is identity.
#[derive(Clone)]
pub struct FunctionPtr(pub(crate) Rc<FunctionType>);

impl FunctionPtr {
    pub fn new(function: FunctionType) -> Self {
        FunctionPtr(Rc::new(function))
    }

    pub fn ptr_eq(&self, other: &FunctionPtr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for FunctionPtr {
    type Target = FunctionType;

    fn deref(&self) -> &FunctionType {
        &self.0
    }
}

impl fmt::Debug for FunctionPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
