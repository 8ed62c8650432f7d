//! Vectors with O(1) concatenation.
//!
//! A vector's items may include embedded vectors: pseudo-elements that
//! splice another vector's contents in place. Each embedded vector of
//! length `n` occupies one slot but contributes `n` to [`VectorType::len`],
//! tracked as `n - 1` of "embed excess". List comprehensions build their
//! results this way so nested comprehensions concatenate without copying.
//!
//! Random access needs a flat sequence. The first indexed access of a
//! vector with embedded items flattens it once into a cached backing
//! sequence; iteration walks the embedded items in place and never
//! flattens.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::Value;
use crate::accounting::HeapSizeAccounting;

/// Shared storage of [`VectorType`] and [`EmbeddedVectorType`].
pub struct VectorObject {
    items: Vec<Value>,
    embed_excess: usize,
    flat: OnceCell<Vec<Value>>,
    accounting: Option<HeapSizeAccounting>,
}

impl VectorObject {
    fn len(&self) -> usize {
        self.items.len() + self.embed_excess
    }

    fn as_slice(&self) -> &[Value] {
        if self.embed_excess == 0 {
            return &self.items;
        }
        self.flat.get_or_init(|| {
            let flat: Vec<Value> = VectorIter::new(&self.items).cloned().collect();
            debug_assert_eq!(flat.len(), self.len());
            if let Some(accounting) = &self.accounting {
                accounting.add_vector_elements(flat.len());
            }
            flat
        })
    }

    /// Values held directly by this object, including the flattened copy
    /// if one was made. Used by the collector to follow references.
    pub(crate) fn held_values(&self) -> impl Iterator<Item = &Value> {
        self.items
            .iter()
            .chain(self.flat.get().into_iter().flatten())
    }

    /// Give back accounted slots and hand out the held values so the
    /// caller can drop them without recursing.
    fn release(&mut self) -> Vec<Value> {
        let mut values = std::mem::take(&mut self.items);
        let flat = self.flat.take().unwrap_or_default();
        if let Some(accounting) = &self.accounting {
            accounting.remove_vector_elements(values.len() + flat.len());
        }
        self.embed_excess = 0;
        values.extend(flat);
        values
    }
}

impl Drop for VectorObject {
    fn drop(&mut self) {
        // Deeply nested vectors ([a, [b, [c, ...]]]) would otherwise drop
        // recursively, one native frame per level.
        let mut pending = self.release();
        while let Some(value) = pending.pop() {
            let rc = match value {
                Value::Vector(VectorType(rc)) | Value::EmbeddedVector(EmbeddedVectorType(rc)) => {
                    rc
                }
                _ => continue,
            };
            if let Some(mut inner) = Rc::into_inner(rc) {
                pending.extend(inner.release());
            }
        }
    }
}

/// Depth-first iterator over a vector's elements, descending into
/// embedded vectors.
pub struct VectorIter<'a> {
    stack: SmallVec<[std::slice::Iter<'a, Value>; 4]>,
}

impl<'a> VectorIter<'a> {
    fn new(items: &'a [Value]) -> Self {
        let mut stack = SmallVec::new();
        stack.push(items.iter());
        VectorIter { stack }
    }
}

impl<'a> Iterator for VectorIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(Value::EmbeddedVector(embedded)) => {
                    self.stack.push(embedded.0.items.iter());
                }
                Some(value) => return Some(value),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Accumulates elements for a new vector.
///
/// Pushing an embedded vector splices it: larger ones are kept as a single
/// slot, a one-element one is inlined, an empty one is dropped.
pub struct VectorBuilder {
    items: Vec<Value>,
    embed_excess: usize,
    accounting: Option<HeapSizeAccounting>,
}

impl VectorBuilder {
    pub fn new(accounting: Option<HeapSizeAccounting>) -> Self {
        VectorBuilder {
            items: Vec::new(),
            embed_excess: 0,
            accounting,
        }
    }

    pub fn with_capacity(capacity: usize, accounting: Option<HeapSizeAccounting>) -> Self {
        VectorBuilder {
            items: Vec::with_capacity(capacity),
            embed_excess: 0,
            accounting,
        }
    }

    pub fn push(&mut self, value: Value) {
        match value {
            Value::EmbeddedVector(embedded) => match embedded.len() {
                0 => {}
                1 => {
                    if let Some(single) = embedded.iter().next() {
                        self.items.push(single.clone());
                    }
                }
                n => {
                    self.embed_excess += n - 1;
                    self.items.push(Value::EmbeddedVector(embedded));
                }
            },
            other => self.items.push(other),
        }
    }

    /// Element count of the vector being built.
    pub fn len(&self) -> usize {
        self.items.len() + self.embed_excess
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn finish(self) -> Rc<VectorObject> {
        if let Some(accounting) = &self.accounting {
            accounting.add_vector_elements(self.items.len());
        }
        Rc::new(VectorObject {
            items: self.items,
            embed_excess: self.embed_excess,
            flat: OnceCell::new(),
            accounting: self.accounting,
        })
    }

    pub fn build(self) -> VectorType {
        VectorType(self.finish())
    }

    pub fn build_embedded(self) -> EmbeddedVectorType {
        EmbeddedVectorType(self.finish())
    }
}

impl Extend<Value> for VectorBuilder {
    fn extend<T: IntoIterator<Item = Value>>(&mut self, iter: T) {
        for value in iter {
            self.push(value);
        }
    }
}

/// An immutable, shared vector value.
#[derive(Clone)]
pub struct VectorType(pub(crate) Rc<VectorObject>);

impl VectorType {
    /// An unaccounted vector of `values`. Mostly for tests and builtins
    /// that have no session at hand.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut builder = VectorBuilder::new(None);
        builder.extend(values);
        builder.build()
    }

    pub fn empty() -> Self {
        VectorBuilder::new(None).build()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> VectorIter<'_> {
        VectorIter::new(&self.0.items)
    }

    /// Flat view of the elements, flattening once if needed.
    pub fn as_slice(&self) -> &[Value] {
        self.0.as_slice()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_slice().get(index)
    }

    /// Whether the flattened copy has been materialized.
    pub fn is_flattened(&self) -> bool {
        self.0.embed_excess == 0 || self.0.flat.get().is_some()
    }

    /// Accounting handle for vectors derived from this one.
    pub fn accounting(&self) -> Option<HeapSizeAccounting> {
        self.0.accounting.clone()
    }

    pub fn ptr_eq(&self, other: &VectorType) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Reinterpret as an embedded vector sharing the same storage.
    pub fn into_embedded(self) -> EmbeddedVectorType {
        EmbeddedVectorType(self.0)
    }
}

impl fmt::Debug for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A vector spliced into its parent vector.
#[derive(Clone)]
pub struct EmbeddedVectorType(pub(crate) Rc<VectorObject>);

impl EmbeddedVectorType {
    pub fn empty() -> Self {
        VectorBuilder::new(None).build_embedded()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> VectorIter<'_> {
        VectorIter::new(&self.0.items)
    }

    pub fn accounting(&self) -> Option<HeapSizeAccounting> {
        self.0.accounting.clone()
    }

    /// Reinterpret as a standalone vector sharing the same storage.
    pub fn into_vector(self) -> VectorType {
        VectorType(self.0)
    }
}

impl fmt::Debug for EmbeddedVectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("embedded")?;
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
