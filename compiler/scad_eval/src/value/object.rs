//! Insertion-ordered objects with string keys.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::Value;

pub struct ObjectObject {
    entries: Vec<(Rc<str>, Value)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl ObjectObject {
    pub(crate) fn held_values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

/// Collects members for a new object.
#[derive(Default)]
pub struct ObjectBuilder {
    entries: Vec<(Rc<str>, Value)>,
    index: FxHashMap<Rc<str>, usize>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        ObjectBuilder::default()
    }

    /// Add a member. Setting an existing key replaces its value in place.
    pub fn set(&mut self, key: impl Into<Rc<str>>, value: Value) {
        let key = key.into();
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(Rc::clone(&key), self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn build(self) -> ObjectType {
        ObjectType(Rc::new(ObjectObject {
            entries: self.entries,
            index: self.index,
        }))
    }
}

/// An immutable, shared object value.
#[derive(Clone)]
pub struct ObjectType(pub(crate) Rc<ObjectObject>);

impl ObjectType {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.index.get(key).map(|&i| &self.0.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.index.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Rc<str>> {
        self.0.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Value)> {
        self.0.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.0.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.entries.is_empty()
    }

    pub fn ptr_eq(&self, other: &ObjectType) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
