//! Treat "no item at that position" as an absent key.

use fbulk_error::BulkError;

/// Turns a correlation miss into `None`.
///
/// A position past the end of the windowed traversal is an ordinary
/// outcome when probing ordinals, so only `PositionOutOfRange` is folded
/// away. `EmptySequence` and every other error still propagate.
///
/// ```ignore
/// use fbulk::compat::OptionalExtension;
///
/// while let Some(key) = seq.key_at(window, ordinal).optional()? {
///     ordinal += 1;
/// }
/// ```
pub trait OptionalExtension<T> {
    fn optional(self) -> Result<Option<T>, BulkError>;
}

impl<T> OptionalExtension<T> for Result<T, BulkError> {
    fn optional(self) -> Result<Option<T>, BulkError> {
        match self {
            Ok(key) => Ok(Some(key)),
            Err(BulkError::PositionOutOfRange { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_key_is_kept() {
        let resolved: Result<i64, BulkError> = Ok(500);
        assert_eq!(resolved.optional().unwrap(), Some(500));
    }

    #[test]
    fn past_the_window_is_absent() {
        let resolved: Result<i64, BulkError> = Err(BulkError::PositionOutOfRange {
            position: 9,
            available: 2,
        });
        assert_eq!(resolved.optional().unwrap(), None);
    }

    #[test]
    fn empty_sequence_still_fails() {
        let resolved: Result<i64, BulkError> = Err(BulkError::EmptySequence);
        assert_eq!(resolved.optional().unwrap_err(), BulkError::EmptySequence);
    }
}
