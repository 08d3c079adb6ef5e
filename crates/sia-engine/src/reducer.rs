//! Slice reducer contract

use crate::context::ReduceContext;
use std::sync::Arc;

/// Pure `(slice, command) -> slice` transition
///
/// # Contract
/// - Never mutates the input slice
/// - Returns the *same* `Arc` when the command has no observable effect
/// - Deterministic for a given slice, command and context
/// - Total: unknown targets are no-ops, never panics
pub trait SliceReducer {
    /// State slice this reducer owns
    type Slice;

    /// Commands addressed to the slice
    type Command;

    /// Compute the next slice
    fn reduce(
        slice: &Arc<Self::Slice>,
        command: &Self::Command,
        ctx: &ReduceContext,
    ) -> Arc<Self::Slice>;
}

/// Wrap a modified copy, or hand back the original when nothing changed
#[inline]
pub(crate) fn commit<T>(original: &Arc<T>, next: Option<T>) -> Arc<T> {
    match next {
        Some(value) => Arc::new(value),
        None => Arc::clone(original),
    }
}
