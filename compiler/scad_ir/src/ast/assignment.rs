//! Assignments, call arguments and parameter lists.
//!
//! All three share one shape: an optional name bound to an optional
//! expression. Positional call arguments have an empty name; parameters
//! without a default have no expression.

use std::rc::Rc;

use super::SharedExpr;
use crate::Location;

/// `name = expr` as written in a scope, a `let`, an argument list, or a
/// parameter list.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    /// Bound name. Empty for positional arguments.
    pub name: Rc<str>,
    pub expr: Option<SharedExpr>,
    pub location: Location,
    /// Where a later assignment to the same name in the same scope replaced
    /// this one's expression.
    pub overwrite_location: Option<Location>,
}

impl Assignment {
    /// A named binding.
    pub fn new(name: impl Into<Rc<str>>, expr: SharedExpr) -> Self {
        let location = expr.location.clone();
        Assignment {
            name: name.into(),
            expr: Some(expr),
            location,
            overwrite_location: None,
        }
    }

    /// A positional call argument.
    pub fn positional(expr: SharedExpr) -> Self {
        Assignment::new("", expr)
    }

    /// A parameter with no default value.
    pub fn parameter(name: impl Into<Rc<str>>) -> Self {
        Assignment {
            name: name.into(),
            expr: None,
            location: Location::NONE,
            overwrite_location: None,
        }
    }

    /// Replace the location reported in diagnostics.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[inline]
    pub fn is_positional(&self) -> bool {
        self.name.is_empty()
    }
}

/// Ordered list of assignments.
pub type AssignmentList = Vec<Assignment>;

/// Parameter lists are shared between a definition and every closure
/// created from it.
pub type ParameterList = Rc<[Assignment]>;
