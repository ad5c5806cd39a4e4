//! Batch executor.
//!
//! Walks a windowed traversal strictly in ascending key order, one item at a
//! time, and applies a mutation to each item. Positions are assigned by
//! traversal order and are the only identity a failure carries; any
//! reordering or parallel dispatch would break correlation, so there is none.
//!
//! The executor never commits or rolls back. Successful mutations stay
//! applied to the external store whatever the mode.

use fbulk_seq::SparseOrderedSequence;
use fbulk_types::{BatchResult, ExecMode, FailureRecord, ItemError, Key, Window};
use tracing::{debug, info, info_span, warn};

use crate::config::{BatchConfig, CorrelationStrategy};
use crate::correlator::IndexCorrelator;
use crate::instrumentation;

/// One mutation against the external store.
///
/// On success returns the number of rows the mutation affected. Failures
/// are reported as an opaque code plus message and are never retried here.
pub trait Mutation<V: ?Sized> {
    /// Apply the mutation for `key`.
    ///
    /// # Errors
    ///
    /// Returns the store's error for this single item.
    fn apply(&mut self, key: Key, value: &V) -> Result<u64, ItemError>;
}

impl<V, F> Mutation<V> for F
where
    V: ?Sized,
    F: FnMut(Key, &V) -> Result<u64, ItemError>,
{
    fn apply(&mut self, key: Key, value: &V) -> Result<u64, ItemError> {
        self(key, value)
    }
}

/// Drives a [`Mutation`] over a sparse sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchExecutor {
    config: BatchConfig,
}

impl BatchExecutor {
    #[must_use]
    pub const fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Executor with default settings and the given mode.
    #[must_use]
    pub fn with_mode(mode: ExecMode) -> Self {
        Self::new(BatchConfig::with_mode(mode))
    }

    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> ExecMode {
        self.config.mode
    }

    /// Correlator over the same sequence and window, using this executor's
    /// correlation strategy.
    #[must_use]
    pub const fn correlator<'a, V>(
        &self,
        sequence: &'a SparseOrderedSequence<V>,
        window: Option<Window>,
    ) -> IndexCorrelator<'a, V> {
        IndexCorrelator::new(sequence, window, self.config.correlation)
    }

    /// Run `mutate` over every item of `sequence` inside `window`.
    ///
    /// Fail-fast stops at the first failure and returns it as the only
    /// record; no later item is attempted. Save-all records every failure
    /// and visits the whole traversal. Either way
    /// `success_count + failures.len()` is the number of items attempted.
    pub fn run<V, M>(
        &self,
        sequence: &SparseOrderedSequence<V>,
        window: Option<Window>,
        mutate: &mut M,
    ) -> BatchResult
    where
        M: Mutation<V> + ?Sized,
    {
        let mode = self.config.mode;
        let span = info_span!(
            "batch_run",
            mode = mode.as_str(),
            window_start = window.map(Window::start),
            window_end = window.map(Window::end),
        );
        let _guard = span.enter();

        instrumentation::record_batch(mode);
        let mut result = BatchResult::empty(mode);

        for item in sequence.iterate(window).positioned() {
            let outcome = mutate.apply(item.key, item.value);
            instrumentation::record_item(outcome.is_ok());
            match outcome {
                Ok(rows) => {
                    result.success_count += 1;
                    if self.config.record_row_counts {
                        result.row_counts.push(rows);
                    }
                }
                Err(err) => {
                    warn!(
                        position = item.position.get(),
                        code = err.code.get(),
                        message = %err.message,
                        "batch item failed"
                    );
                    debug!(position = item.position.get(), key = item.key, "failed item key");
                    if self.config.record_row_counts {
                        result.row_counts.push(0);
                    }
                    result.failures.push(FailureRecord::new(item.position, err));
                    if mode == ExecMode::FailFast {
                        instrumentation::record_abort();
                        info!(
                            position = item.position.get(),
                            succeeded = result.success_count,
                            "batch aborted on first failure"
                        );
                        return result;
                    }
                }
            }
        }

        info!(
            succeeded = result.success_count,
            failed = result.failures.len(),
            "batch complete"
        );
        result
    }
}

/// Run `mutate` over `sequence` in `mode` with default settings.
pub fn run<V, M>(
    sequence: &SparseOrderedSequence<V>,
    window: Option<Window>,
    mode: ExecMode,
    mutate: &mut M,
) -> BatchResult
where
    M: Mutation<V> + ?Sized,
{
    BatchExecutor::new(BatchConfig {
        mode,
        correlation: CorrelationStrategy::Walk,
        record_row_counts: true,
    })
    .run(sequence, window, mutate)
}
