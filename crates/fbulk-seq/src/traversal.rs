//! Windowed traversal iterators.

use std::collections::btree_map::Range;
use std::iter::FusedIterator;

use fbulk_types::{BatchItem, Key, Position};

/// Lazy ascending traversal over a window of a sparse sequence.
///
/// Cloning a traversal restarts nothing; it forks the cursor at its current
/// point. Call [`SparseOrderedSequence::iterate`] again to restart.
///
/// [`SparseOrderedSequence::iterate`]: crate::SparseOrderedSequence::iterate
#[derive(Debug, Clone)]
pub struct Traversal<'a, V> {
    range: Range<'a, Key, V>,
}

impl<'a, V> Traversal<'a, V> {
    pub(crate) const fn new(range: Range<'a, Key, V>) -> Self {
        Self { range }
    }

    /// Attach 1-based positions in traversal order.
    #[must_use]
    pub const fn positioned(self) -> Positioned<'a, V> {
        Positioned {
            inner: self,
            next_position: Position::FIRST,
        }
    }
}

impl<'a, V> Iterator for Traversal<'a, V> {
    type Item = (Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|(k, v)| (*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<V> FusedIterator for Traversal<'_, V> {}

/// Traversal that numbers each item with its position.
#[derive(Debug, Clone)]
pub struct Positioned<'a, V> {
    inner: Traversal<'a, V>,
    next_position: Position,
}

impl<'a, V> Iterator for Positioned<'a, V> {
    type Item = BatchItem<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;
        let position = self.next_position;
        self.next_position = position.next();
        Some(BatchItem {
            position,
            key,
            value,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> FusedIterator for Positioned<'_, V> {}

#[cfg(test)]
mod tests {
    use fbulk_types::Window;

    use crate::SparseOrderedSequence;

    #[test]
    fn positions_are_ordinals_not_keys() {
        let seq =
            SparseOrderedSequence::try_from_pairs([(1, 'a'), (2, 'b'), (3, 'c'), (4, 'd'), (5, 'e')])
                .unwrap();
        let window = Window::new(3, 5).unwrap();
        let items: Vec<(usize, i64, char)> = seq
            .iterate(Some(window))
            .positioned()
            .map(|item| (item.position.get(), item.key, *item.value))
            .collect();
        assert_eq!(items, vec![(1, 3, 'c'), (2, 4, 'd'), (3, 5, 'e')]);
    }

    #[test]
    fn exhausted_traversal_stays_exhausted() {
        let seq = SparseOrderedSequence::try_from_pairs([(10, ())]).unwrap();
        let mut walk = seq.iterate(None);
        assert_eq!(walk.next().map(|(k, _)| k), Some(10));
        assert!(walk.next().is_none());
        assert!(walk.next().is_none());
    }
}
