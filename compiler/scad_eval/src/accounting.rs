//! Heap size accounting.
//!
//! The memory manager schedules collection passes on an approximate heap
//! size: one point per live context, per context variable, and per vector
//! element. The counter is shared by every context and vector of a session.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct Counters {
    contexts: Cell<usize>,
    variables: Cell<usize>,
    vector_elements: Cell<usize>,
}

/// Shared handle to a session's heap counters.
#[derive(Clone, Default)]
pub struct HeapSizeAccounting(Rc<Counters>);

fn add(cell: &Cell<usize>, n: usize) {
    cell.set(cell.get().saturating_add(n));
}

fn sub(cell: &Cell<usize>, n: usize) {
    debug_assert!(cell.get() >= n, "heap accounting underflow");
    cell.set(cell.get().saturating_sub(n));
}

impl HeapSizeAccounting {
    pub fn new() -> Self {
        HeapSizeAccounting::default()
    }

    pub fn add_context(&self) {
        add(&self.0.contexts, 1);
    }

    pub fn remove_context(&self) {
        sub(&self.0.contexts, 1);
    }

    pub fn add_variables(&self, n: usize) {
        add(&self.0.variables, n);
    }

    pub fn remove_variables(&self, n: usize) {
        sub(&self.0.variables, n);
    }

    pub fn add_vector_elements(&self, n: usize) {
        add(&self.0.vector_elements, n);
    }

    pub fn remove_vector_elements(&self, n: usize) {
        sub(&self.0.vector_elements, n);
    }

    pub fn contexts(&self) -> usize {
        self.0.contexts.get()
    }

    pub fn variables(&self) -> usize {
        self.0.variables.get()
    }

    pub fn vector_elements(&self) -> usize {
        self.0.vector_elements.get()
    }

    /// Total accounted size.
    pub fn size(&self) -> usize {
        self.contexts() + self.variables() + self.vector_elements()
    }
}

impl fmt::Debug for HeapSizeAccounting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapSizeAccounting")
            .field("contexts", &self.contexts())
            .field("variables", &self.variables())
            .field("vector_elements", &self.vector_elements())
            .finish()
    }
}
