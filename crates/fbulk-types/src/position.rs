//! Keys and traversal positions.
//!
//! A [`Key`] lives in the sequence's key space and may be sparse. A
//! [`Position`] is the 1-based ordinal of an item inside one windowed
//! traversal. The two are never interchangeable: position 3 is "the third
//! item visited", whatever its key happens to be.

use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Integer key of a sparse sequence entry.
pub type Key = i64;

/// 1-based ordinal of an item within a windowed traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Position(NonZeroUsize);

impl Position {
    /// The first position of any traversal.
    pub const FIRST: Self = Self(NonZeroUsize::MIN);

    /// Create a position, returning `None` for zero.
    #[must_use]
    pub const fn new(n: usize) -> Option<Self> {
        match NonZeroUsize::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// The raw 1-based ordinal.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// The position after this one, saturating at `usize::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Zero-based offset, for indexing per-position buffers.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Position {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "position must be >= 1".to_owned())
    }
}

impl From<Position> for usize {
    fn from(value: Position) -> Self {
        value.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_position() {
        assert!(Position::new(0).is_none());
        assert_eq!(Position::new(1), Some(Position::FIRST));
    }

    #[test]
    fn next_and_index() {
        let p = Position::FIRST.next().next();
        assert_eq!(p.get(), 3);
        assert_eq!(p.index(), 2);
        assert_eq!(p.to_string(), "3");
    }

    #[test]
    fn serde_rejects_zero() {
        let p: Position = serde_json::from_str("5").unwrap();
        assert_eq!(p.get(), 5);
        assert!(serde_json::from_str::<Position>("0").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "5");
    }
}
