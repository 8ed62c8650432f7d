//! Variable storage of a single context.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::accounting::HeapSizeAccounting;
use crate::value::Value;

/// Whether `name` lives in the special (`$`) namespace.
///
/// `$children` is the exception: it is bound lexically by module contexts.
#[inline]
pub fn is_config_variable(name: &str) -> bool {
    name.starts_with('$') && name != "$children"
}

/// Variable table of one context.
///
/// Ordinary and special variables are kept in separate maps; the name
/// decides which one, so a name can never be bound in both.
pub struct ContextFrame {
    lexical: FxHashMap<Rc<str>, Value>,
    config: FxHashMap<Rc<str>, Value>,
    accounting: HeapSizeAccounting,
}

impl ContextFrame {
    pub fn new(accounting: HeapSizeAccounting) -> Self {
        ContextFrame {
            lexical: FxHashMap::default(),
            config: FxHashMap::default(),
            accounting,
        }
    }

    fn map_for(&self, name: &str) -> &FxHashMap<Rc<str>, Value> {
        if is_config_variable(name) {
            &self.config
        } else {
            &self.lexical
        }
    }

    /// Binding of `name` in this frame only.
    pub fn lookup_local_variable(&self, name: &str) -> Option<&Value> {
        self.map_for(name).get(name)
    }

    /// Bind `name`, replacing an existing binding in this frame.
    pub fn set_variable(&mut self, name: impl Into<Rc<str>>, value: Value) {
        let name = name.into();
        let map = if is_config_variable(&name) {
            &mut self.config
        } else {
            &mut self.lexical
        };
        if map.insert(name, value).is_none() {
            self.accounting.add_variables(1);
        }
    }

    /// Copy every binding of `other` into this frame.
    pub fn apply_variables(&mut self, other: &ContextFrame) {
        self.apply_lexical_variables(other);
        self.apply_config_variables(other);
    }

    pub fn apply_lexical_variables(&mut self, other: &ContextFrame) {
        for (name, value) in &other.lexical {
            self.set_variable(Rc::clone(name), value.clone());
        }
    }

    /// Copy only the `$` variables of `other`.
    pub fn apply_config_variables(&mut self, other: &ContextFrame) {
        for (name, value) in &other.config {
            self.set_variable(Rc::clone(name), value.clone());
        }
    }

    /// Remove every binding, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        self.take_values().len()
    }

    /// Move every bound value out, leaving the frame empty.
    ///
    /// The caller decides where the values are dropped; the collector drops
    /// them only after it released all of its borrows.
    pub(crate) fn take_values(&mut self) -> Vec<Value> {
        let removed = self.len();
        let values: Vec<Value> = self
            .lexical
            .drain()
            .chain(self.config.drain())
            .map(|(_, value)| value)
            .collect();
        self.accounting.remove_variables(removed);
        values
    }

    pub fn len(&self) -> usize {
        self.lexical.len() + self.config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every value held by this frame.
    pub(crate) fn values(&self) -> impl Iterator<Item = &Value> {
        self.lexical.values().chain(self.config.values())
    }

    /// Lexical bindings, in unspecified order.
    pub fn lexical_variables(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.lexical.iter()
    }

    /// Special bindings, in unspecified order.
    pub fn config_variables(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.config.iter()
    }
}

impl Drop for ContextFrame {
    fn drop(&mut self) {
        self.accounting.remove_variables(self.len());
    }
}
