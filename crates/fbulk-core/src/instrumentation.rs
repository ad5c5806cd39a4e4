//! Batch observability counters.
//!
//! Process-local counters updated by the executor and the correlator. They
//! are monotonic between resets and never influence execution.

use std::sync::atomic::{AtomicU64, Ordering};

use fbulk_types::ExecMode;

/// Snapshot of per-mode batch totals for `fbulk_batches_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchModeTotals {
    pub fail_fast: u64,
    pub save_all: u64,
}

/// Snapshot of batch observability metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchMetricsSnapshot {
    /// Batches run, by mode.
    pub fbulk_batches_total: BatchModeTotals,
    /// Fail-fast batches that stopped on a failure.
    pub fbulk_batches_aborted_total: u64,
    /// Items the mutation was invoked for.
    pub fbulk_items_attempted_total: u64,
    /// Items whose mutation succeeded.
    pub fbulk_items_succeeded_total: u64,
    /// Items whose mutation failed.
    pub fbulk_items_failed_total: u64,
    /// Position-to-key lookups answered.
    pub fbulk_correlations_total: u64,
    /// `next` steps taken by walking correlators.
    pub fbulk_correlation_steps_total: u64,
}

static BATCH_FAIL_FAST_TOTAL: AtomicU64 = AtomicU64::new(0);
static BATCH_SAVE_ALL_TOTAL: AtomicU64 = AtomicU64::new(0);
static BATCH_ABORTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static ITEMS_ATTEMPTED_TOTAL: AtomicU64 = AtomicU64::new(0);
static ITEMS_SUCCEEDED_TOTAL: AtomicU64 = AtomicU64::new(0);
static ITEMS_FAILED_TOTAL: AtomicU64 = AtomicU64::new(0);
static CORRELATIONS_TOTAL: AtomicU64 = AtomicU64::new(0);
static CORRELATION_STEPS_TOTAL: AtomicU64 = AtomicU64::new(0);

pub(crate) fn record_batch(mode: ExecMode) {
    let counter = match mode {
        ExecMode::FailFast => &BATCH_FAIL_FAST_TOTAL,
        ExecMode::SaveAll => &BATCH_SAVE_ALL_TOTAL,
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_abort() {
    BATCH_ABORTED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_item(succeeded: bool) {
    ITEMS_ATTEMPTED_TOTAL.fetch_add(1, Ordering::Relaxed);
    let counter = if succeeded {
        &ITEMS_SUCCEEDED_TOTAL
    } else {
        &ITEMS_FAILED_TOTAL
    };
    counter.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_correlation(steps: usize) {
    CORRELATIONS_TOTAL.fetch_add(1, Ordering::Relaxed);
    let steps = u64::try_from(steps).unwrap_or(u64::MAX);
    CORRELATION_STEPS_TOTAL.fetch_add(steps, Ordering::Relaxed);
}

/// Return a snapshot of batch observability counters.
#[must_use]
pub fn batch_metrics_snapshot() -> BatchMetricsSnapshot {
    BatchMetricsSnapshot {
        fbulk_batches_total: BatchModeTotals {
            fail_fast: BATCH_FAIL_FAST_TOTAL.load(Ordering::Relaxed),
            save_all: BATCH_SAVE_ALL_TOTAL.load(Ordering::Relaxed),
        },
        fbulk_batches_aborted_total: BATCH_ABORTED_TOTAL.load(Ordering::Relaxed),
        fbulk_items_attempted_total: ITEMS_ATTEMPTED_TOTAL.load(Ordering::Relaxed),
        fbulk_items_succeeded_total: ITEMS_SUCCEEDED_TOTAL.load(Ordering::Relaxed),
        fbulk_items_failed_total: ITEMS_FAILED_TOTAL.load(Ordering::Relaxed),
        fbulk_correlations_total: CORRELATIONS_TOTAL.load(Ordering::Relaxed),
        fbulk_correlation_steps_total: CORRELATION_STEPS_TOTAL.load(Ordering::Relaxed),
    }
}

/// Reset all batch observability counters.
pub fn reset_batch_metrics() {
    BATCH_FAIL_FAST_TOTAL.store(0, Ordering::Relaxed);
    BATCH_SAVE_ALL_TOTAL.store(0, Ordering::Relaxed);
    BATCH_ABORTED_TOTAL.store(0, Ordering::Relaxed);
    ITEMS_ATTEMPTED_TOTAL.store(0, Ordering::Relaxed);
    ITEMS_SUCCEEDED_TOTAL.store(0, Ordering::Relaxed);
    ITEMS_FAILED_TOTAL.store(0, Ordering::Relaxed);
    CORRELATIONS_TOTAL.store(0, Ordering::Relaxed);
    CORRELATION_STEPS_TOTAL.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are process-global and tests run in parallel, so only
    // monotonic growth is asserted here.
    #[test]
    fn counters_grow_monotonically() {
        let before = batch_metrics_snapshot();
        record_batch(ExecMode::SaveAll);
        record_item(true);
        record_item(false);
        record_correlation(4);
        let after = batch_metrics_snapshot();

        assert!(after.fbulk_batches_total.save_all > before.fbulk_batches_total.save_all);
        assert!(after.fbulk_items_attempted_total >= before.fbulk_items_attempted_total + 2);
        assert!(after.fbulk_items_succeeded_total > before.fbulk_items_succeeded_total);
        assert!(after.fbulk_items_failed_total > before.fbulk_items_failed_total);
        assert!(after.fbulk_correlation_steps_total >= before.fbulk_correlation_steps_total + 4);
    }
}
