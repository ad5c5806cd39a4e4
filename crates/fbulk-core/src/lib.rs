//! Batch execution with partial-failure collection and sparse-index
//! correlation.
//!
//! [`BatchExecutor`] walks a windowed [`SparseOrderedSequence`] and applies a
//! caller-supplied [`Mutation`] to each item. Failures are reported by
//! traversal position only; [`IndexCorrelator`] maps a position back to the
//! key that produced it by re-walking the same window.
//!
//! Transaction boundaries are never crossed here. [`MemStore`] is a small
//! transactional store for callers (and tests) that want to decide commit
//! or rollback around a run.
//!
//! [`SparseOrderedSequence`]: fbulk_seq::SparseOrderedSequence

pub mod config;
pub mod correlator;
pub mod error_map;
pub mod executor;
pub mod instrumentation;
pub mod store;
pub mod transaction;

pub use config::{BatchConfig, CorrelationStrategy};
pub use correlator::{IndexCorrelator, ResolvedFailure, resolve};
pub use error_map::{ErrorCodeTable, ErrorKind};
pub use executor::{BatchExecutor, Mutation, run};
pub use instrumentation::{
    BatchMetricsSnapshot, BatchModeTotals, batch_metrics_snapshot, reset_batch_metrics,
};
pub use store::{MemStore, StoreWriter, WriteMode};
pub use transaction::{ReleaseOutcome, TransactionController, TxnScope, TxnState};
