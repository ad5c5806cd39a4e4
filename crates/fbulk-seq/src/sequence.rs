//! B-tree backed sparse sequence.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Bound;

use fbulk_error::{BulkError, Result};
use fbulk_types::{Key, Window};
use tracing::debug;

use crate::traversal::Traversal;

/// Ordered mapping from integer key to value, with gaps allowed.
///
/// Keys are unique and always iterate in ascending order regardless of
/// insertion order. `first`/`next`/`seek` are `O(log n)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseOrderedSequence<V> {
    entries: BTreeMap<Key, V>,
}

impl<V> SparseOrderedSequence<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Build a sequence from `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::DuplicateKey`] on the first repeated key.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Key, V)>,
    {
        let mut seq = Self::new();
        for (key, value) in pairs {
            seq.insert(key, value)?;
        }
        Ok(seq)
    }

    /// Insert a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::DuplicateKey`] if `key` is already present; the
    /// existing value is left untouched.
    pub fn insert(&mut self, key: Key, value: V) -> Result<()> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => {
                debug!(key, "rejecting duplicate key");
                Err(BulkError::DuplicateKey { key })
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: Key) -> Option<&V> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn contains_key(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest key, or `None` when empty.
    #[must_use]
    pub fn first(&self) -> Option<Key> {
        self.entries.keys().next().copied()
    }

    /// Largest key, or `None` when empty.
    #[must_use]
    pub fn last(&self) -> Option<Key> {
        self.entries.keys().next_back().copied()
    }

    /// Smallest key strictly greater than `key`.
    ///
    /// `key` itself need not be present.
    #[must_use]
    pub fn next(&self, key: Key) -> Option<Key> {
        self.entries
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .map(|(k, _)| *k)
    }

    /// Smallest key greater than or equal to `key`.
    #[must_use]
    pub fn seek(&self, key: Key) -> Option<Key> {
        self.entries.range(key..).next().map(|(k, _)| *k)
    }

    /// Ascending traversal of the entries inside `window` (all entries when
    /// `window` is `None`).
    ///
    /// The traversal borrows the sequence, so it cannot observe mutation;
    /// calling this again yields the same items in the same order.
    #[must_use]
    pub fn iterate(&self, window: Option<Window>) -> Traversal<'_, V> {
        match window {
            Some(w) => Traversal::new(self.entries.range(w.as_range())),
            None => Traversal::new(self.entries.range::<Key, _>(..)),
        }
    }

    /// Number of items a traversal over `window` yields.
    #[must_use]
    pub fn window_len(&self, window: Option<Window>) -> usize {
        match window {
            Some(_) => self.iterate(window).count(),
            None => self.len(),
        }
    }

    /// Keys inside `window`, in traversal order.
    #[must_use]
    pub fn keys(&self, window: Option<Window>) -> Vec<Key> {
        self.iterate(window).map(|(key, _)| key).collect()
    }
}

impl<V> Default for SparseOrderedSequence<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a SparseOrderedSequence<V> {
    type Item = (Key, &'a V);
    type IntoIter = Traversal<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iterate(None)
    }
}
