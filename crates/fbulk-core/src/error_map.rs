//! Caller-owned mapping from store error codes to error kinds.
//!
//! The executor treats [`ErrorCode`] as opaque. Adapters for a concrete
//! store register the codes they care about here and use the table to
//! decide what to do with a batch's failures (report, retry, or give up).

use std::collections::{BTreeMap, HashMap};

use fbulk_error::{BulkError, Result};
use fbulk_types::{BatchResult, ErrorCode, Position};
use serde::{Deserialize, Serialize};

/// Coarse classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unique, check, or foreign-key constraint violated.
    Constraint,
    /// Value does not fit the target column.
    ValueTooLarge,
    /// Target row does not exist.
    NotFound,
    /// Busy, locked, or timed out; may succeed on retry.
    Transient,
    /// Code not registered.
    Unknown,
}

impl ErrorKind {
    /// Stable label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constraint => "constraint",
            Self::ValueTooLarge => "value_too_large",
            Self::NotFound => "not_found",
            Self::Transient => "transient",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ErrorCodeEntry {
    code: ErrorCode,
    kind: ErrorKind,
}

/// Table of registered error codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCodeTable {
    kinds: HashMap<ErrorCode, ErrorKind>,
}

impl ErrorCodeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, code: impl Into<ErrorCode>, kind: ErrorKind) -> Self {
        self.register(code, kind);
        self
    }

    /// Register `code`, returning the kind it previously mapped to.
    pub fn register(&mut self, code: impl Into<ErrorCode>, kind: ErrorKind) -> Option<ErrorKind> {
        self.kinds.insert(code.into(), kind)
    }

    /// Kind for `code`; unregistered codes are [`ErrorKind::Unknown`].
    #[must_use]
    pub fn kind_of(&self, code: ErrorCode) -> ErrorKind {
        self.kinds.get(&code).copied().unwrap_or(ErrorKind::Unknown)
    }

    #[must_use]
    pub fn is_retryable(&self, code: ErrorCode) -> bool {
        self.kind_of(code).is_retryable()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Group the failure positions of `result` by kind. Positions within a
    /// kind stay in ascending order.
    #[must_use]
    pub fn classify(&self, result: &BatchResult) -> BTreeMap<ErrorKind, Vec<Position>> {
        let mut groups: BTreeMap<ErrorKind, Vec<Position>> = BTreeMap::new();
        for failure in &result.failures {
            groups
                .entry(self.kind_of(failure.code))
                .or_default()
                .push(failure.position);
        }
        groups
    }

    /// Load a table from a JSON array of `{ "code": i32, "kind": "..." }`.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Config`] on malformed JSON or when a code is
    /// listed twice.
    pub fn from_json(text: &str) -> Result<Self> {
        let entries: Vec<ErrorCodeEntry> =
            serde_json::from_str(text).map_err(|err| BulkError::Config(err.to_string()))?;
        let mut table = Self::new();
        for entry in entries {
            if table.register(entry.code, entry.kind).is_some() {
                return Err(BulkError::Config(format!(
                    "error code {} listed more than once",
                    entry.code
                )));
            }
        }
        Ok(table)
    }

    /// Serialize to a JSON array sorted by code.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Internal`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut entries: Vec<ErrorCodeEntry> = self
            .kinds
            .iter()
            .map(|(&code, &kind)| ErrorCodeEntry { code, kind })
            .collect();
        entries.sort_by_key(|entry| entry.code);
        serde_json::to_string(&entries).map_err(|err| BulkError::internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fbulk_types::{ExecMode, FailureRecord, ItemError};

    fn pos(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    fn table() -> ErrorCodeTable {
        ErrorCodeTable::new()
            .with(-1, ErrorKind::Constraint)
            .with(-1438, ErrorKind::ValueTooLarge)
            .with(-54, ErrorKind::Transient)
    }

    #[test]
    fn unregistered_codes_are_unknown() {
        let table = table();
        assert_eq!(table.kind_of(ErrorCode(-1)), ErrorKind::Constraint);
        assert_eq!(table.kind_of(ErrorCode(42)), ErrorKind::Unknown);
        assert!(table.is_retryable(ErrorCode(-54)));
        assert!(!table.is_retryable(ErrorCode(-1438)));
    }

    #[test]
    fn register_reports_previous_kind() {
        let mut table = ErrorCodeTable::new();
        assert_eq!(table.register(5, ErrorKind::NotFound), None);
        assert_eq!(table.register(5, ErrorKind::Transient), Some(ErrorKind::NotFound));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn classify_groups_positions_by_kind() {
        let result = BatchResult {
            mode: ExecMode::SaveAll,
            success_count: 2,
            failures: vec![
                FailureRecord::new(pos(1), ItemError::new(-1438, "a")),
                FailureRecord::new(pos(3), ItemError::new(-1, "b")),
                FailureRecord::new(pos(4), ItemError::new(-1438, "c")),
                FailureRecord::new(pos(6), ItemError::new(99, "d")),
            ],
            row_counts: Vec::new(),
        };
        let groups = table().classify(&result);
        assert_eq!(groups[&ErrorKind::ValueTooLarge], vec![pos(1), pos(4)]);
        assert_eq!(groups[&ErrorKind::Constraint], vec![pos(3)]);
        assert_eq!(groups[&ErrorKind::Unknown], vec![pos(6)]);
        assert!(!groups.contains_key(&ErrorKind::Transient));
    }

    #[test]
    fn json_load_and_dump() {
        let table = ErrorCodeTable::from_json(
            r#"[{"code": -1, "kind": "constraint"}, {"code": -54, "kind": "transient"}]"#,
        )
        .unwrap();
        assert_eq!(table.kind_of(ErrorCode(-54)), ErrorKind::Transient);
        assert_eq!(
            table.to_json().unwrap(),
            r#"[{"code":-54,"kind":"transient"},{"code":-1,"kind":"constraint"}]"#
        );
    }

    #[test]
    fn json_duplicate_code_is_rejected() {
        let err = ErrorCodeTable::from_json(
            r#"[{"code": 1, "kind": "constraint"}, {"code": 1, "kind": "not_found"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, BulkError::Config(_)));
    }
}
