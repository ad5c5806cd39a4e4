//! Caller-side transaction scope.
//!
//! The batch executor never begins, commits, or rolls back anything. Those
//! decisions belong to the caller, who wraps a run in a [`TxnScope`] and
//! chooses what to do with partial progress: commit what succeeded before a
//! fail-fast abort, commit everything a save-all run managed, or roll it all
//! back.
//!
//! [`TransactionController`] is the bookkeeping half of a scope: state, the
//! LIFO savepoint stack, and the undo-log mark each savepoint restores to.
//! Stores own the data and the undo log and delegate to it.

use fbulk_error::{BulkError, Result};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Scope trait
// ---------------------------------------------------------------------------

/// Transaction boundary operations a store exposes to its caller.
pub trait TxnScope {
    /// Current state.
    fn state(&self) -> TxnState;

    /// Start a transaction.
    ///
    /// # Errors
    /// Returns [`BulkError::TransactionActive`] if one is already open.
    fn begin(&mut self) -> Result<()>;

    /// Make all work since BEGIN permanent.
    ///
    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] outside a transaction.
    fn commit(&mut self) -> Result<()>;

    /// Undo all work since BEGIN.
    ///
    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] outside a transaction.
    fn rollback(&mut self) -> Result<()>;

    /// Push a named savepoint, implicitly beginning a transaction if idle.
    ///
    /// # Errors
    /// Store-specific.
    fn savepoint(&mut self, name: &str) -> Result<()>;

    /// Keep work since `name` and drop `name` and every later savepoint.
    ///
    /// # Errors
    /// Returns [`BulkError::NoSuchSavepoint`] if `name` is not on the stack.
    fn release(&mut self, name: &str) -> Result<()>;

    /// Undo work since `name`, leaving `name` on the stack.
    ///
    /// # Errors
    /// Returns [`BulkError::NoSuchSavepoint`] if `name` is not on the stack.
    fn rollback_to(&mut self, name: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Transaction state
// ---------------------------------------------------------------------------

/// Whether a transaction is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Autocommit: writes are permanent immediately.
    Idle,
    /// Writes are provisional until COMMIT.
    Active,
}

/// A savepoint on the LIFO stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SavepointEntry {
    /// User-visible savepoint name.
    name: String,
    /// Undo-log length when the savepoint was taken.
    mark: usize,
}

/// What a RELEASE did to the enclosing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The transaction is still open.
    Released,
    /// The outermost savepoint of an implicit transaction was released,
    /// which commits it.
    Committed,
}

// ---------------------------------------------------------------------------
// TransactionController
// ---------------------------------------------------------------------------

/// Transaction state machine with a savepoint stack.
#[derive(Debug, Default)]
pub struct TransactionController {
    active: bool,
    savepoints: Vec<SavepointEntry>,
    /// The transaction was started by a SAVEPOINT rather than BEGIN.
    implicit_txn: bool,
}

impl TransactionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> TxnState {
        if self.active {
            TxnState::Active
        } else {
            TxnState::Idle
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of savepoints on the stack.
    #[must_use]
    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    /// # Errors
    /// Returns [`BulkError::TransactionActive`] if already active.
    pub fn begin(&mut self) -> Result<()> {
        if self.active {
            return Err(BulkError::TransactionActive);
        }
        self.active = true;
        info!("transaction started");
        Ok(())
    }

    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] when idle.
    pub fn commit(&mut self) -> Result<()> {
        if !self.active {
            return Err(BulkError::NoActiveTransaction);
        }
        info!(savepoint_depth = self.savepoints.len(), "commit");
        self.reset();
        Ok(())
    }

    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] when idle.
    pub fn rollback(&mut self) -> Result<()> {
        if !self.active {
            return Err(BulkError::NoActiveTransaction);
        }
        info!(savepoint_depth = self.savepoints.len(), "rollback");
        self.reset();
        Ok(())
    }

    /// Push a savepoint that restores to undo-log length `mark`.
    ///
    /// Outside a transaction this implicitly begins one.
    ///
    /// # Errors
    /// Propagates [`begin`](Self::begin) failures.
    pub fn savepoint(&mut self, name: &str, mark: usize) -> Result<()> {
        if !self.active {
            self.begin()?;
            self.implicit_txn = true;
        }
        self.savepoints.push(SavepointEntry {
            name: name.to_owned(),
            mark,
        });
        debug!(
            savepoint = %name,
            depth = self.savepoints.len(),
            mark,
            "savepoint created"
        );
        Ok(())
    }

    /// Remove `name` and every later savepoint.
    ///
    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] when idle, or
    /// [`BulkError::NoSuchSavepoint`] if `name` is not on the stack.
    pub fn release(&mut self, name: &str) -> Result<ReleaseOutcome> {
        let pos = self.find_savepoint(name)?;
        let removed = self.savepoints.len() - pos;
        self.savepoints.truncate(pos);
        debug!(
            savepoint = %name,
            removed,
            remaining = self.savepoints.len(),
            "savepoint released"
        );

        if self.savepoints.is_empty() && self.implicit_txn {
            self.commit()?;
            return Ok(ReleaseOutcome::Committed);
        }
        Ok(ReleaseOutcome::Released)
    }

    /// Drop every savepoint newer than `name` and return the undo-log mark
    /// to restore to.
    ///
    /// # Errors
    /// Returns [`BulkError::NoActiveTransaction`] when idle, or
    /// [`BulkError::NoSuchSavepoint`] if `name` is not on the stack.
    pub fn rollback_to(&mut self, name: &str) -> Result<usize> {
        let pos = self.find_savepoint(name)?;
        self.savepoints.truncate(pos + 1);
        let mark = self.savepoints[pos].mark;
        info!(
            savepoint = %name,
            depth = self.savepoints.len(),
            mark,
            "rollback to savepoint"
        );
        Ok(mark)
    }

    /// Find a savepoint by name (case-insensitive, searches from top of stack).
    fn find_savepoint(&self, name: &str) -> Result<usize> {
        if !self.active {
            return Err(BulkError::NoActiveTransaction);
        }
        self.savepoints
            .iter()
            .rposition(|sp| sp.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| BulkError::NoSuchSavepoint(name.to_owned()))
    }

    fn reset(&mut self) {
        self.active = false;
        self.savepoints.clear();
        self.implicit_txn = false;
    }
}
