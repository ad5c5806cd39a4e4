//! Inclusive key-space windows.

use std::fmt;
use std::ops::RangeInclusive;

use fbulk_error::{BulkError, Result};
use serde::{Deserialize, Serialize};

use crate::position::Key;

/// Inclusive `[start, end]` bound in key space.
///
/// Bounds are keys, not positions, and need not be present in the sequence.
/// A window that covers no keys is valid and yields an empty traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct Window {
    start: Key,
    end: Key,
}

#[derive(Deserialize)]
struct RawWindow {
    start: Key,
    end: Key,
}

impl TryFrom<RawWindow> for Window {
    type Error = BulkError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl Window {
    /// Create a window `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::InvalidWindow`] when `start > end`.
    pub fn new(start: Key, end: Key) -> Result<Self> {
        if start > end {
            return Err(BulkError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window covering exactly one key.
    #[must_use]
    pub const fn single(key: Key) -> Self {
        Self {
            start: key,
            end: key,
        }
    }

    /// Window from `start` to the largest representable key.
    #[must_use]
    pub const fn from_start(start: Key) -> Self {
        Self {
            start,
            end: Key::MAX,
        }
    }

    #[must_use]
    pub const fn start(self) -> Key {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> Key {
        self.end
    }

    #[must_use]
    pub const fn contains(self, key: Key) -> bool {
        key >= self.start && key <= self.end
    }

    #[must_use]
    pub const fn as_range(self) -> RangeInclusive<Key> {
        self.start..=self.end
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl TryFrom<RangeInclusive<Key>> for Window {
    type Error = BulkError;

    fn try_from(range: RangeInclusive<Key>) -> Result<Self> {
        Self::new(*range.start(), *range.end())
    }
}
