//! Cycle collection for contexts.
//!
//! A function value keeps its defining context alive, and a context can
//! hold function values in its variables. That is enough to build cycles
//! that reference counting never frees. The memory manager keeps a pool of
//! weakly held contexts and periodically runs a three-phase pass over it:
//!
//! 1. Root detection: count, for every context and container, the
//!    references coming from inside the pool (directly, or through values
//!    that are themselves only referenced from inside the pool). A context
//!    whose strong count exceeds that number is held from outside the
//!    context graph, i.e. from the running evaluation, and is a root.
//! 2. Reachability: mark everything reachable from the roots.
//! 3. Collection: clear the variables of every unmarked context, which
//!    breaks the cycles, then release the pool's references newest first.
//!
//! Contexts whose last holder lets go outside a pass are freed immediately
//! by reference counting; the pool only exists to break cycles.

use std::cell::Ref;
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::accounting::HeapSizeAccounting;
use crate::context::{Context, ContextFrame, ContextKind, WeakContext};
use crate::value::Value;

/// Identity and strong count of a container value, if it has one.
fn value_identity(value: &Value) -> Option<(usize, usize)> {
    match value {
        Value::Vector(v) => Some((Rc::as_ptr(&v.0) as usize, Rc::strong_count(&v.0))),
        Value::EmbeddedVector(v) => Some((Rc::as_ptr(&v.0) as usize, Rc::strong_count(&v.0))),
        Value::Object(o) => Some((Rc::as_ptr(&o.0) as usize, Rc::strong_count(&o.0))),
        Value::Function(f) => Some((Rc::as_ptr(&f.0) as usize, Rc::strong_count(&f.0))),
        Value::Undefined(_)
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Range(_) => None,
    }
}

/// Push the values and contexts `value` holds onto the work queues.
fn expand_value<'a>(
    value: &'a Value,
    values: &mut VecDeque<&'a Value>,
    contexts: &mut VecDeque<&'a Context>,
) {
    match value {
        Value::Vector(v) => values.extend(v.0.held_values()),
        Value::EmbeddedVector(v) => values.extend(v.0.held_values()),
        Value::Object(o) => values.extend(o.0.held_values()),
        Value::Function(f) => contexts.push_back(&f.0.context),
        _ => {}
    }
}

/// Pool length below which dead entries are never pruned.
const MIN_PRUNE_LEN: usize = 1024;

/// Pool of contexts that may take part in reference cycles.
pub struct ContextMemoryManager {
    accounting: HeapSizeAccounting,
    managed: Vec<WeakContext>,
    next_collection_size: usize,
    /// Pool length at which entries of already freed contexts are dropped.
    prune_at: usize,
    passes: usize,
}

impl ContextMemoryManager {
    pub fn new(accounting: HeapSizeAccounting, initial_threshold: usize) -> Self {
        ContextMemoryManager {
            accounting,
            managed: Vec::new(),
            next_collection_size: initial_threshold,
            prune_at: MIN_PRUNE_LEN,
            passes: 0,
        }
    }

    /// Take over a context released by its creator.
    ///
    /// `context` is the releasing handle's reference. If nothing else holds
    /// the context it is freed as soon as that reference goes away, and the
    /// pool never sees it. A context is only taken over once.
    pub fn add_context(&mut self, context: &Context) {
        if !context.mark_accounted() {
            return;
        }
        self.accounting.add_context();

        if context.holder_count() > 1 {
            self.managed.push(context.downgrade());

            if self.accounting.size() >= self.next_collection_size {
                self.collect();
                // Next pass at twice the surviving heap size.
                self.next_collection_size = self.accounting.size() * 2;
            } else if self.managed.len() >= self.prune_at {
                self.prune();
            }
        }
    }

    /// Forget pool entries whose context was already freed by reference
    /// counting.
    fn prune(&mut self) {
        self.managed.retain(WeakContext::is_alive);
        self.prune_at = (self.managed.len() * 2).max(MIN_PRUNE_LEN);
    }

    /// Run one collection pass; returns the number of contexts reclaimed.
    pub fn collect(&mut self) -> usize {
        self.passes += 1;
        let mut contexts: Vec<Context> = self.managed.iter().filter_map(WeakContext::upgrade).collect();

        let Some(roots) = find_roots(&contexts) else {
            debug!("context collection skipped: a frame is in use");
            self.managed = contexts.iter().map(Context::downgrade).collect();
            return 0;
        };
        let reachable = find_reachable(roots);

        self.managed.clear();
        let mut garbage: Vec<Vec<Value>> = Vec::new();
        for context in &contexts {
            let unreachable = reachable.as_ref().is_some_and(|r| !r.contains(&context.id()));
            let cleared = unreachable
                .then(|| context.0.frame.try_borrow_mut().ok())
                .flatten()
                .map(|mut frame| frame.take_values());
            match cleared {
                Some(values) => garbage.push(values),
                None => self.managed.push(context.downgrade()),
            }
        }
        let reclaimed = garbage.len();
        drop(garbage);
        self.prune_at = (self.managed.len() * 2).max(MIN_PRUNE_LEN);

        // Release newest first, bounding the depth of cascading drops.
        scad_stack::ensure_sufficient_stack(|| {
            while let Some(context) = contexts.pop() {
                drop(context);
            }
        });

        debug!(
            pass = self.passes,
            reclaimed,
            remaining = self.managed.len(),
            heap_size = self.accounting.size(),
            "context collection"
        );
        reclaimed
    }

    /// Number of live contexts in the pool.
    pub fn managed_count(&self) -> usize {
        self.managed.iter().filter(|c| c.upgrade().is_some()).count()
    }

    /// Heap size at which the next pass runs.
    pub fn next_collection_size(&self) -> usize {
        self.next_collection_size
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Phase 1. Returns the contexts held from outside the graph, or `None`
/// if some frame could not be inspected.
fn find_roots(contexts: &[Context]) -> Option<Vec<Context>> {
    let mut frames: Vec<Ref<'_, ContextFrame>> = Vec::with_capacity(contexts.len());
    let mut parents: Vec<Ref<'_, Option<Context>>> = Vec::with_capacity(contexts.len());
    for context in contexts {
        frames.push(context.0.frame.try_borrow().ok()?);
        parents.push(context.0.parent.try_borrow().ok()?);
    }

    let mut value_refs: FxHashMap<usize, usize> = FxHashMap::default();
    let mut context_refs: FxHashMap<usize, usize> = FxHashMap::default();
    let mut fully_accounted: FxHashSet<usize> = FxHashSet::default();

    let mut value_queue: VecDeque<&Value> = VecDeque::new();
    let mut context_queue: VecDeque<&Context> = VecDeque::new();

    for (i, context) in contexts.iter().enumerate() {
        value_queue.extend(frames[i].values());
        if let Some(parent) = parents[i].as_ref() {
            context_queue.push_back(parent);
        }
        if let ContextKind::Module { children, .. } = context.kind() {
            context_queue.push_back(&children.context);
        }
        // The reference held by `contexts` itself.
        context_refs.insert(context.id(), 1);
    }

    loop {
        if let Some(value) = value_queue.pop_front() {
            let Some((id, required)) = value_identity(value) else {
                continue;
            };
            let accounted = value_refs.entry(id).or_insert(0);
            *accounted += 1;
            debug_assert!(*accounted <= required);
            if *accounted == required {
                expand_value(value, &mut value_queue, &mut context_queue);
            }
        } else if let Some(context) = context_queue.pop_front() {
            let accounted = context_refs.entry(context.id()).or_insert(0);
            *accounted += 1;
            if *accounted == context.holder_count() {
                fully_accounted.insert(context.id());
            }
        } else {
            break;
        }
    }

    Some(
        contexts
            .iter()
            .filter(|c| !fully_accounted.contains(&c.id()))
            .cloned()
            .collect(),
    )
}

/// Phase 2. Ids of every context reachable from `roots`, or `None` if a
/// frame could not be inspected (everything is then kept).
fn find_reachable(roots: Vec<Context>) -> Option<FxHashSet<usize>> {
    let mut contexts_seen: FxHashSet<usize> = roots.iter().map(Context::id).collect();
    let mut values_seen: FxHashSet<usize> = FxHashSet::default();
    let mut context_queue: VecDeque<Context> = roots.into();
    let mut value_queue: VecDeque<Value> = VecDeque::new();

    let mut visit_value = |value: &Value, queue: &mut VecDeque<Value>| {
        if let Some((id, _)) = value_identity(value) {
            if values_seen.insert(id) {
                queue.push_back(value.clone());
            }
        }
    };

    loop {
        if let Some(value) = value_queue.pop_front() {
            let mut nested = VecDeque::new();
            let mut referenced = VecDeque::new();
            expand_value(&value, &mut nested, &mut referenced);
            for held in nested {
                visit_value(held, &mut value_queue);
            }
            for context in referenced {
                if contexts_seen.insert(context.id()) {
                    context_queue.push_back(context.clone());
                }
            }
        } else if let Some(context) = context_queue.pop_front() {
            let frame = context.0.frame.try_borrow().ok()?;
            for value in frame.values() {
                visit_value(value, &mut value_queue);
            }
            drop(frame);
            for referenced in context.referenced_contexts() {
                if contexts_seen.insert(referenced.id()) {
                    context_queue.push_back(referenced);
                }
            }
        } else {
            break;
        }
    }
    Some(contexts_seen)
}

impl Drop for ContextMemoryManager {
    fn drop(&mut self) {
        if !self.managed.is_empty() {
            self.collect();
        }
    }
}
