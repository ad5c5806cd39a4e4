//! Error types for fbulk.
//!
//! Hard failures only. A single mutation failing inside a batch is not a
//! `BulkError`: it is captured as an `ItemError` in `fbulk-types` and
//! surfaced through the batch result.

use thiserror::Error;

/// Errors that propagate out of sequence construction, correlation,
/// configuration, and the transactional store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    /// A key was inserted twice into a sparse sequence.
    #[error("duplicate key {key} in sparse sequence")]
    DuplicateKey { key: i64 },

    /// Window bounds are inverted.
    #[error("invalid window: start {start} > end {end}")]
    InvalidWindow { start: i64, end: i64 },

    /// Correlation was requested against a sequence with no keys.
    #[error("cannot correlate position against an empty sequence")]
    EmptySequence,

    /// The position does not exist in the windowed traversal.
    ///
    /// `available` is the number of positions the traversal produced before
    /// it ran out.
    #[error("position {position} out of range: traversal has {available} item(s)")]
    PositionOutOfRange { position: usize, available: usize },

    /// COMMIT, ROLLBACK, RELEASE or ROLLBACK TO outside a transaction.
    #[error("no active transaction")]
    NoActiveTransaction,

    /// BEGIN inside an already active transaction.
    #[error("transaction already active")]
    TransactionActive,

    /// RELEASE or ROLLBACK TO named a savepoint that is not on the stack.
    #[error("no such savepoint: {0}")]
    NoSuchSavepoint(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BulkError {
    /// Build an [`BulkError::Internal`] from any displayable message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error indicates a position/window pair that could not be
    /// resolved against a sequence.
    #[must_use]
    pub const fn is_correlation_error(&self) -> bool {
        matches!(
            self,
            Self::EmptySequence | Self::PositionOutOfRange { .. }
        )
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BulkError>;
