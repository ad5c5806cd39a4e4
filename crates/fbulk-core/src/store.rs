//! In-memory transactional keyed store.
//!
//! `MemStore` is the external collaborator in its simplest form: rows keyed
//! like the batch sequence, an undo log for provisional writes, and a
//! [`TransactionController`] for scope bookkeeping. [`StoreWriter`] turns a
//! store plus a validation rule into a [`Mutation`] the executor can drive.

use std::collections::BTreeMap;

use fbulk_error::Result;
use fbulk_types::{ItemError, Key};
use tracing::debug;

use crate::executor::Mutation;
use crate::transaction::{ReleaseOutcome, TransactionController, TxnScope, TxnState};

#[derive(Debug, Clone)]
struct UndoEntry<V> {
    key: Key,
    before: Option<V>,
}

/// Keyed rows with BEGIN/COMMIT/ROLLBACK and savepoints.
///
/// Writes made while idle are permanent immediately. Inside a transaction
/// every write logs the row's prior image so ROLLBACK and ROLLBACK TO can
/// restore it.
#[derive(Debug)]
pub struct MemStore<V> {
    rows: BTreeMap<Key, V>,
    undo: Vec<UndoEntry<V>>,
    txn: TransactionController,
}

impl<V> Default for MemStore<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            undo: Vec::new(),
            txn: TransactionController::new(),
        }
    }
}

impl<V: Clone> MemStore<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `rows`, outside any transaction.
    pub fn with_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Key, V)>,
    {
        Self {
            rows: rows.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn get(&self, key: Key) -> Option<&V> {
        self.rows.get(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &V)> {
        self.rows.iter().map(|(k, v)| (*k, v))
    }

    /// Number of provisional writes not yet committed.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.undo.len()
    }

    /// Insert or replace a row, returning the previous value.
    pub fn put(&mut self, key: Key, value: V) -> Option<V> {
        let before = self.rows.insert(key, value);
        self.log_undo(key, before.clone());
        before
    }

    /// Replace an existing row. Returns `false` (and writes nothing) when
    /// the key is absent.
    pub fn update(&mut self, key: Key, value: V) -> bool {
        match self.rows.get_mut(&key) {
            Some(slot) => {
                let before = std::mem::replace(slot, value);
                self.log_undo(key, Some(before));
                true
            }
            None => false,
        }
    }

    /// Remove a row, returning it.
    pub fn delete(&mut self, key: Key) -> Option<V> {
        let before = self.rows.remove(&key);
        if before.is_some() {
            self.log_undo(key, before.clone());
        }
        before
    }

    fn log_undo(&mut self, key: Key, before: Option<V>) {
        if self.txn.is_active() {
            self.undo.push(UndoEntry { key, before });
        }
    }

    /// Undo provisional writes back to undo-log length `mark`, newest first.
    fn undo_to(&mut self, mark: usize) {
        let undone = self.undo.len().saturating_sub(mark);
        while self.undo.len() > mark {
            let Some(entry) = self.undo.pop() else { break };
            match entry.before {
                Some(value) => {
                    self.rows.insert(entry.key, value);
                }
                None => {
                    self.rows.remove(&entry.key);
                }
            }
        }
        debug!(undone, mark, "undo log replayed");
    }
}

impl<V: Clone> TxnScope for MemStore<V> {
    fn state(&self) -> TxnState {
        self.txn.state()
    }

    fn begin(&mut self) -> Result<()> {
        self.txn.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.txn.commit()?;
        self.undo.clear();
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.txn.rollback()?;
        self.undo_to(0);
        Ok(())
    }

    fn savepoint(&mut self, name: &str) -> Result<()> {
        self.txn.savepoint(name, self.undo.len())
    }

    fn release(&mut self, name: &str) -> Result<()> {
        if self.txn.release(name)? == ReleaseOutcome::Committed {
            self.undo.clear();
        }
        Ok(())
    }

    fn rollback_to(&mut self, name: &str) -> Result<()> {
        let mark = self.txn.rollback_to(name)?;
        self.undo_to(mark);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// StoreWriter
// ---------------------------------------------------------------------------

/// How a [`StoreWriter`] applies each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Insert or replace; always affects one row.
    #[default]
    Upsert,
    /// Replace existing rows only; absent keys affect zero rows and are not
    /// failures.
    Update,
}

/// A [`Mutation`] that validates each item and writes it into a
/// [`MemStore`].
///
/// `check` plays the part of the store's constraints: returning an error
/// rejects the item before anything is written.
pub struct StoreWriter<'s, V, C> {
    store: &'s mut MemStore<V>,
    check: C,
    mode: WriteMode,
}

impl<'s, V, C> StoreWriter<'s, V, C>
where
    V: Clone,
    C: FnMut(Key, &V) -> std::result::Result<(), ItemError>,
{
    pub fn new(store: &'s mut MemStore<V>, mode: WriteMode, check: C) -> Self {
        Self { store, check, mode }
    }
}

impl<V, C> Mutation<V> for StoreWriter<'_, V, C>
where
    V: Clone,
    C: FnMut(Key, &V) -> std::result::Result<(), ItemError>,
{
    fn apply(&mut self, key: Key, value: &V) -> std::result::Result<u64, ItemError> {
        (self.check)(key, value)?;
        let rows = match self.mode {
            WriteMode::Upsert => {
                self.store.put(key, value.clone());
                1
            }
            WriteMode::Update => u64::from(self.store.update(key, value.clone())),
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbulk_error::BulkError;

    fn store() -> MemStore<i64> {
        MemStore::with_rows([(1, 10), (2, 20), (3, 30)])
    }

    fn rows(store: &MemStore<i64>) -> Vec<(Key, i64)> {
        store.iter().map(|(k, v)| (k, *v)).collect()
    }

    #[test]
    fn idle_writes_autocommit() {
        let mut s = store();
        s.put(4, 40);
        assert_eq!(s.pending_writes(), 0);
        assert_eq!(s.get(4), Some(&40));
    }

    #[test]
    fn rollback_restores_prior_images() {
        let mut s = store();
        s.begin().unwrap();
        s.put(1, 11);
        s.put(9, 90);
        assert!(s.update(2, 22));
        assert_eq!(s.delete(3), Some(30));
        s.rollback().unwrap();
        assert_eq!(rows(&s), vec![(1, 10), (2, 20), (3, 30)]);
        assert_eq!(s.state(), TxnState::Idle);
    }

    #[test]
    fn commit_keeps_writes() {
        let mut s = store();
        s.begin().unwrap();
        s.put(1, 11);
        s.commit().unwrap();
        assert_eq!(s.get(1), Some(&11));
        assert_eq!(s.pending_writes(), 0);
        assert_eq!(s.rollback().unwrap_err(), BulkError::NoActiveTransaction);
    }

    #[test]
    fn update_of_absent_key_writes_nothing() {
        let mut s = store();
        s.begin().unwrap();
        assert!(!s.update(7, 70));
        assert_eq!(s.pending_writes(), 0);
        assert_eq!(s.get(7), None);
    }

    #[test]
    fn rollback_to_savepoint_is_partial() {
        let mut s = store();
        s.begin().unwrap();
        s.put(1, 11);
        s.savepoint("mid").unwrap();
        s.put(2, 22);
        s.put(2, 222);
        s.rollback_to("mid").unwrap();
        assert_eq!(rows(&s), vec![(1, 11), (2, 20), (3, 30)]);
        s.commit().unwrap();
        assert_eq!(s.get(1), Some(&11));
    }

    #[test]
    fn implicit_savepoint_release_commits() {
        let mut s = store();
        s.savepoint("only").unwrap();
        s.put(5, 50);
        s.release("only").unwrap();
        assert_eq!(s.state(), TxnState::Idle);
        assert_eq!(s.pending_writes(), 0);
        assert_eq!(s.get(5), Some(&50));
    }

    #[test]
    fn writer_checks_before_writing() {
        let mut s = store();
        let mut writer = StoreWriter::new(&mut s, WriteMode::Upsert, |_, v: &i64| {
            if *v > 100 {
                Err(ItemError::new(-1438, "value too large"))
            } else {
                Ok(())
            }
        });
        assert_eq!(writer.apply(1, &50), Ok(1));
        assert!(writer.apply(2, &500).is_err());
        assert_eq!(s.get(1), Some(&50));
        assert_eq!(s.get(2), Some(&20));
    }

    #[test]
    fn writer_update_mode_counts_rows() {
        let mut s = store();
        let mut writer = StoreWriter::new(&mut s, WriteMode::Update, |_, _: &i64| Ok(()));
        assert_eq!(writer.apply(2, &21), Ok(1));
        assert_eq!(writer.apply(8, &80), Ok(0));
        assert_eq!(s.get(8), None);
    }
}
