//! Executor configuration.

use fbulk_error::{BulkError, Result};
use fbulk_types::ExecMode;
use serde::{Deserialize, Serialize};

/// How the correlator maps a position back to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrategy {
    /// Re-walk the window with `next` on every lookup. Cost is linear in
    /// the position; no memory is held between lookups.
    #[default]
    Walk,
    /// Collect the window's keys once, then answer lookups by index.
    Indexed,
}

/// Settings for a [`BatchExecutor`](crate::BatchExecutor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Failure handling mode.
    pub mode: ExecMode,
    /// Strategy used by correlators built from this config.
    pub correlation: CorrelationStrategy,
    /// Collect per-position affected row counts into the result.
    pub record_row_counts: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mode: ExecMode::FailFast,
            correlation: CorrelationStrategy::Walk,
            record_row_counts: true,
        }
    }
}

impl BatchConfig {
    /// Default config with the given mode.
    #[must_use]
    pub fn with_mode(mode: ExecMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Config`] on malformed JSON or unknown fields.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| BulkError::Config(err.to_string()))
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::Internal`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| BulkError::internal(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_abort_on_first_error() {
        let config = BatchConfig::default();
        assert_eq!(config.mode, ExecMode::FailFast);
        assert_eq!(config.correlation, CorrelationStrategy::Walk);
        assert!(config.record_row_counts);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = BatchConfig::from_json(r#"{ "mode": "save_all" }"#).unwrap();
        assert_eq!(config, BatchConfig::with_mode(ExecMode::SaveAll));

        let config = BatchConfig::from_json(r#"{ "correlation": "indexed", "record_row_counts": false }"#)
            .unwrap();
        assert_eq!(config.mode, ExecMode::FailFast);
        assert_eq!(config.correlation, CorrelationStrategy::Indexed);
        assert!(!config.record_row_counts);
    }

    #[test]
    fn unknown_fields_are_config_errors() {
        let err = BatchConfig::from_json(r#"{ "mdoe": "save_all" }"#).unwrap_err();
        assert!(matches!(err, BulkError::Config(_)));
        let err = BatchConfig::from_json(r#"{ "mode": "sometimes" }"#).unwrap_err();
        assert!(matches!(err, BulkError::Config(_)));
    }

    #[test]
    fn json_round_trip() {
        let config = BatchConfig {
            mode: ExecMode::SaveAll,
            correlation: CorrelationStrategy::Indexed,
            record_row_counts: false,
        };
        let text = config.to_json().unwrap();
        assert_eq!(BatchConfig::from_json(&text).unwrap(), config);
    }
}
