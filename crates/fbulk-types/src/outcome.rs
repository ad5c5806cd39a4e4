//! Batch execution modes, per-item failures, and batch results.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{Key, Position};

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Opaque error code reported by the external store.
///
/// The executor never inspects it. Interpreting codes is the job of a
/// caller-owned code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ErrorCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// A single mutation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("error {code}: {message}")]
pub struct ItemError {
    pub code: ErrorCode,
    pub message: String,
}

impl ItemError {
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution mode
// ---------------------------------------------------------------------------

/// How a batch reacts to a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    /// Stop at the first failure; later items are never attempted.
    #[default]
    FailFast,
    /// Record every failure and keep going.
    SaveAll,
}

impl ExecMode {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::SaveAll => "save_all",
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Items and results
// ---------------------------------------------------------------------------

/// One item as the executor sees it during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchItem<'a, V> {
    pub position: Position,
    pub key: Key,
    pub value: &'a V,
}

/// A failed item, identified only by its traversal position.
///
/// The key is deliberately absent; recover it by correlating the position
/// against the same sequence and window used for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub position: Position,
    pub code: ErrorCode,
    pub message: String,
}

impl FailureRecord {
    #[must_use]
    pub fn new(position: Position, error: ItemError) -> Self {
        Self {
            position,
            code: error.code,
            message: error.message,
        }
    }
}

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Mode the batch ran in.
    pub mode: ExecMode,
    /// Number of items whose mutation succeeded.
    pub success_count: usize,
    /// Failures in strictly increasing position order.
    pub failures: Vec<FailureRecord>,
    /// Rows affected per attempted position (`row_counts[p - 1]`); failed
    /// positions record zero. Empty when row counting is disabled.
    pub row_counts: Vec<u64>,
}

impl BatchResult {
    #[must_use]
    pub const fn empty(mode: ExecMode) -> Self {
        Self {
            mode,
            success_count: 0,
            failures: Vec::new(),
            row_counts: Vec::new(),
        }
    }

    /// Number of items the executor invoked the mutation for.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.success_count + self.failures.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// True when every attempted item succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when a fail-fast run stopped on a failure.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.mode == ExecMode::FailFast && !self.failures.is_empty()
    }

    /// Rows affected at `position`, if row counts were recorded.
    #[must_use]
    pub fn row_count(&self, position: Position) -> Option<u64> {
        self.row_counts.get(position.index()).copied()
    }

    /// Total rows affected across the batch.
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.row_counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn item_error_display() {
        let err = ItemError::new(-1438, "value larger than specified precision");
        assert_eq!(
            err.to_string(),
            "error -1438: value larger than specified precision"
        );
    }

    #[test]
    fn failure_record_takes_error_fields() {
        let rec = FailureRecord::new(pos(2), ItemError::new(1, "boom"));
        assert_eq!(rec.position, pos(2));
        assert_eq!(rec.code, ErrorCode(1));
        assert_eq!(rec.message, "boom");
    }

    #[test]
    fn result_accounting() {
        let result = BatchResult {
            mode: ExecMode::SaveAll,
            success_count: 4,
            failures: vec![
                FailureRecord::new(pos(3), ItemError::new(1, "a")),
                FailureRecord::new(pos(5), ItemError::new(1, "b")),
            ],
            row_counts: vec![1, 2, 0, 1, 0, 3],
        };
        assert_eq!(result.attempted(), 6);
        assert_eq!(result.failure_count(), 2);
        assert!(!result.is_complete());
        assert!(!result.aborted());
        assert_eq!(result.rows_affected(), 7);
        assert_eq!(result.row_count(pos(6)), Some(3));
        assert_eq!(result.row_count(pos(7)), None);
    }

    #[test]
    fn fail_fast_with_failure_is_aborted() {
        let mut result = BatchResult::empty(ExecMode::FailFast);
        assert!(!result.aborted());
        result
            .failures
            .push(FailureRecord::new(pos(1), ItemError::new(9, "x")));
        assert!(result.aborted());
    }

    #[test]
    fn mode_serde_labels() {
        assert_eq!(
            serde_json::to_string(&ExecMode::SaveAll).unwrap(),
            "\"save_all\""
        );
        let mode: ExecMode = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(mode, ExecMode::FailFast);
        assert_eq!(ExecMode::default(), ExecMode::FailFast);
    }
}
