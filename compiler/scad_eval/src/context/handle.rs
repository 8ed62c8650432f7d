//! RAII ownership of freshly created contexts.

use std::fmt;
use std::ops::Deref;

use super::Context;
use crate::errors::EvalError;
use crate::session::EvaluationSession;

/// Owner of a context while it is being evaluated.
///
/// Creating a handle pushes the context on the session's frame stack, so
/// its `$` variables become visible to dynamic lookups. Dropping it (on
/// every exit path, error unwinding included) pops the stack back to where
/// it was and hands the context to the memory manager.
pub struct ContextHandle<'s> {
    session: &'s EvaluationSession,
    context: Context,
    index: usize,
}

impl<'s> ContextHandle<'s> {
    pub(crate) fn new(session: &'s EvaluationSession, context: Context, index: usize) -> Self {
        ContextHandle {
            session,
            context,
            index,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Evaluate the context's statement block.
    pub fn init(&self) -> Result<(), EvalError> {
        self.context.init(self.session)
    }

    /// Take ownership of `other` in place of the current context, which is
    /// released to the memory manager.
    ///
    /// The replacement takes over this handle's slot on the frame stack;
    /// every frame above it is popped.
    pub fn replace_with(&mut self, mut other: ContextHandle<'s>) {
        debug_assert!(other.index > self.index, "replacement must be newer");
        std::mem::swap(&mut self.context, &mut other.context);
        self.session.replace_frame(self.index, &self.context);
        // `other` now owns the old context and sits above the stack top, so
        // dropping it only releases the old context.
        drop(other);
    }
}

impl Deref for ContextHandle<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.context
    }
}

impl fmt::Debug for ContextHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("frame", &self.index)
            .field("context", &self.context)
            .finish()
    }
}

impl Drop for ContextHandle<'_> {
    fn drop(&mut self) {
        self.session.pop_frames(self.index);
        self.session.release_context(&self.context);
    }
}
