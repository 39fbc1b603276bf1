//! Error types for deltascore

use thiserror::Error;

/// Umbrella error for deltascore operations.
///
/// The crate-specific errors (`SessionError`, `GraphError`, `ConfigError`)
/// convert into this type at the facade boundary through their `Display`
/// output, so callers that mix layers can use a single `Result`.
#[derive(Debug, Error)]
pub enum DeltaScoreError {
    /// Error in session configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The compiled constraint graph is malformed
    #[error("Constraint graph error: {0}")]
    Graph(String),

    /// The caller misused a session (unknown fact, illegal update)
    #[error("Session usage error: {0}")]
    Usage(String),

    /// A score string could not be parsed
    #[error(transparent)]
    ScoreParse(#[from] crate::score::ScoreParseError),
}

/// Result type alias for deltascore operations
pub type Result<T> = std::result::Result<T, DeltaScoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{ParseableScore, SimpleScore};

    #[test]
    fn test_score_parse_error_converts() {
        let err: DeltaScoreError = SimpleScore::parse("abc").unwrap_err().into();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_usage_display() {
        let err = DeltaScoreError::Usage("fact #3 is not live".into());
        assert_eq!(err.to_string(), "Session usage error: fact #3 is not live");
    }
}
