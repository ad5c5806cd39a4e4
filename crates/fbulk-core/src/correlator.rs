//! Position-to-key correlation.
//!
//! A failure record carries only its traversal position. To recover the key
//! the correlator re-walks the same sequence with the same window: it starts
//! at the first key inside the window and steps with `next` until it has
//! counted off the requested position. It keeps no memory of prior runs, so
//! it must be handed the exact window the batch used.

use std::cell::OnceCell;

use fbulk_error::{BulkError, Result};
use fbulk_seq::SparseOrderedSequence;
use fbulk_types::{BatchResult, ErrorCode, Key, Position, Window};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CorrelationStrategy;
use crate::instrumentation;

/// A failure with its original key recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFailure {
    pub position: Position,
    pub key: Key,
    pub code: ErrorCode,
    pub message: String,
}

/// Maps traversal positions of one `(sequence, window)` pair back to keys.
///
/// Every lookup is independent and idempotent. With
/// [`CorrelationStrategy::Indexed`] the window's keys are collected on first
/// use and reused; results are identical to walking.
#[derive(Debug)]
pub struct IndexCorrelator<'a, V> {
    sequence: &'a SparseOrderedSequence<V>,
    window: Option<Window>,
    strategy: CorrelationStrategy,
    index: OnceCell<Vec<Key>>,
}

impl<'a, V> IndexCorrelator<'a, V> {
    #[must_use]
    pub const fn new(
        sequence: &'a SparseOrderedSequence<V>,
        window: Option<Window>,
        strategy: CorrelationStrategy,
    ) -> Self {
        Self {
            sequence,
            window,
            strategy,
            index: OnceCell::new(),
        }
    }

    /// Walking correlator.
    #[must_use]
    pub const fn walk(sequence: &'a SparseOrderedSequence<V>, window: Option<Window>) -> Self {
        Self::new(sequence, window, CorrelationStrategy::Walk)
    }

    #[must_use]
    pub const fn window(&self) -> Option<Window> {
        self.window
    }

    #[must_use]
    pub const fn strategy(&self) -> CorrelationStrategy {
        self.strategy
    }

    /// Key that occupied `position` in the windowed traversal.
    ///
    /// # Errors
    ///
    /// - [`BulkError::EmptySequence`] when the sequence has no keys at all.
    /// - [`BulkError::PositionOutOfRange`] when the traversal has fewer than
    ///   `position` items (including an empty window).
    pub fn resolve(&self, position: Position) -> Result<Key> {
        if self.sequence.is_empty() {
            return Err(BulkError::EmptySequence);
        }
        let key = match self.strategy {
            CorrelationStrategy::Walk => self.walk_to(position)?,
            CorrelationStrategy::Indexed => self.lookup(position)?,
        };
        debug!(
            position = position.get(),
            key,
            strategy = ?self.strategy,
            "position correlated"
        );
        Ok(key)
    }

    /// Resolve every failure of `result`, in position order.
    ///
    /// # Errors
    ///
    /// Fails on the first position that cannot be resolved, which means
    /// `result` was not produced from this sequence and window.
    pub fn resolve_failures(&self, result: &BatchResult) -> Result<Vec<ResolvedFailure>> {
        result
            .failures
            .iter()
            .map(|failure| {
                Ok(ResolvedFailure {
                    position: failure.position,
                    key: self.resolve(failure.position)?,
                    code: failure.code,
                    message: failure.message.clone(),
                })
            })
            .collect()
    }

    fn in_window(&self, key: Key) -> bool {
        self.window.is_none_or(|w| key <= w.end())
    }

    fn walk_to(&self, position: Position) -> Result<Key> {
        // The window start is a bound, not necessarily a key: begin at the
        // first key at or after it.
        let start = match self.window {
            Some(w) => self.sequence.seek(w.start()),
            None => self.sequence.first(),
        };
        let Some(mut cursor) = start.filter(|&key| self.in_window(key)) else {
            instrumentation::record_correlation(0);
            return Err(BulkError::PositionOutOfRange {
                position: position.get(),
                available: 0,
            });
        };

        let mut reached = 1usize;
        while reached < position.get() {
            match self.sequence.next(cursor).filter(|&key| self.in_window(key)) {
                Some(key) => {
                    cursor = key;
                    reached += 1;
                }
                None => {
                    instrumentation::record_correlation(reached - 1);
                    return Err(BulkError::PositionOutOfRange {
                        position: position.get(),
                        available: reached,
                    });
                }
            }
        }
        instrumentation::record_correlation(reached - 1);
        Ok(cursor)
    }

    fn lookup(&self, position: Position) -> Result<Key> {
        let keys = self.index.get_or_init(|| self.sequence.keys(self.window));
        instrumentation::record_correlation(0);
        keys.get(position.index())
            .copied()
            .ok_or_else(|| BulkError::PositionOutOfRange {
                position: position.get(),
                available: keys.len(),
            })
    }
}

/// Key at `position` of `sequence` restricted to `window`, by walking.
///
/// # Errors
///
/// See [`IndexCorrelator::resolve`].
pub fn resolve<V>(
    sequence: &SparseOrderedSequence<V>,
    window: Option<Window>,
    position: Position,
) -> Result<Key> {
    IndexCorrelator::walk(sequence, window).resolve(position)
}
