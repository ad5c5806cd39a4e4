//! Method-syntax batch execution on [`SparseOrderedSequence`].

use fbulk_core::{BatchExecutor, Mutation, resolve};
use fbulk_error::{BulkError, Result};
use fbulk_seq::SparseOrderedSequence;
use fbulk_types::{BatchResult, ExecMode, Key, Position, Window};

/// Extension trait for running batches directly off a sequence.
pub trait BulkExt<V> {
    /// Apply `mutate` to every item inside `window`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use fbulk::compat::BulkExt;
    ///
    /// let result = seq.apply_batch(None, ExecMode::SaveAll, &mut |key, v: &i64| Ok(1));
    /// ```
    fn apply_batch<M>(&self, window: Option<Window>, mode: ExecMode, mutate: &mut M) -> BatchResult
    where
        M: Mutation<V> + ?Sized;

    /// Key at 1-based `ordinal` of the windowed traversal, by walking.
    ///
    /// An ordinal of zero is reported as out of range.
    fn key_at(&self, window: Option<Window>, ordinal: usize) -> Result<Key>;
}

impl<V> BulkExt<V> for SparseOrderedSequence<V> {
    fn apply_batch<M>(&self, window: Option<Window>, mode: ExecMode, mutate: &mut M) -> BatchResult
    where
        M: Mutation<V> + ?Sized,
    {
        BatchExecutor::with_mode(mode).run(self, window, mutate)
    }

    fn key_at(&self, window: Option<Window>, ordinal: usize) -> Result<Key> {
        let position = Position::new(ordinal).ok_or_else(|| BulkError::PositionOutOfRange {
            position: 0,
            available: self.window_len(window),
        })?;
        resolve(self, window, position)
    }
}
