//! Stack safety utilities for the evaluator.
//!
//! Two tools live here:
//!
//! - [`check_stack`]: a guard consulted before every recursive evaluation
//!   step. When less than the requested red zone remains on the native
//!   stack it reports [`StackExhausted`] instead of letting the process
//!   overflow. The evaluator turns this into a recursion error.
//! - [`ensure_sufficient_stack`]: grows the stack on demand. Used where the
//!   recursion is structural rather than user-controlled, e.g. releasing a
//!   long chain of scopes or rendering a deeply nested vector.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate.
//! - **WASM targets**: Passthrough; the guard never trips.

/// Default red zone for [`check_stack`] (256KB).
pub const DEFAULT_RED_ZONE: usize = 256 * 1024;

/// Minimum stack space to keep available before growing (100KB).
const GROW_RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// The native stack is too close to its limit to recurse further.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("native stack exhausted ({remaining} bytes left, {red_zone} bytes required)")]
pub struct StackExhausted {
    /// Bytes left on the current stack segment.
    pub remaining: usize,
    /// Red zone the caller asked for.
    pub red_zone: usize,
}

/// Bytes left on the current stack segment, if the platform can tell.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// WASM version - stack depth is not observable.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}

/// Fail if fewer than `red_zone` bytes remain on the native stack.
///
/// Platforms that cannot report the remaining stack always pass.
#[inline]
pub fn check_stack(red_zone: usize) -> Result<(), StackExhausted> {
    match remaining_stack() {
        Some(remaining) if remaining < red_zone => Err(StackExhausted {
            remaining,
            red_zone,
        }),
        _ => Ok(()),
    }
}

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, this will
/// allocate additional stack space before calling `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(GROW_RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
