//! Batch mutation over sparse keyed sequences with deferred failure
//! collection.
//!
//! ```ignore
//! use fbulk::{ExecMode, ItemError, SparseOrderedSequence, Window, resolve, run};
//!
//! let seq = SparseOrderedSequence::try_from_pairs([(1, 100), (100, 200), (500, 300)])?;
//! let result = run(&seq, None, ExecMode::SaveAll, &mut |key, _value: &i64| {
//!     if key == 500 { Err(ItemError::new(-1438, "too large")) } else { Ok(1) }
//! });
//! for failure in &result.failures {
//!     let key = resolve(&seq, None, failure.position)?;
//! }
//! ```

pub mod compat;

pub use fbulk_core::{
    BatchConfig, BatchExecutor, BatchMetricsSnapshot, BatchModeTotals, CorrelationStrategy,
    ErrorCodeTable, ErrorKind, IndexCorrelator, MemStore, Mutation, ReleaseOutcome,
    ResolvedFailure, StoreWriter, TransactionController, TxnScope, TxnState,
    WriteMode, batch_metrics_snapshot, reset_batch_metrics, resolve, run,
};
pub use fbulk_error::{BulkError, Result};
pub use fbulk_seq::{Positioned, SparseOrderedSequence, Traversal};
pub use fbulk_types::{
    BatchItem, BatchResult, ErrorCode, ExecMode, FailureRecord, ItemError, Key, Position, Window,
};
