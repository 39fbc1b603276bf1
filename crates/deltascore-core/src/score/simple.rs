//! Single-level score.

use std::fmt;

use super::traits::{ParseableScore, ScoreParseError};

/// One `i64` level; displayed and parsed as a bare integer.
///
/// ```
/// use deltascore_core::{ParseableScore, SimpleScore};
///
/// assert!(SimpleScore::of(-3) > SimpleScore::of(-5));
/// assert_eq!(SimpleScore::parse("-3init").unwrap(), SimpleScore::of(-3));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScore {
    value: i64,
}

impl SimpleScore {
    #[inline]
    pub const fn of(value: i64) -> Self {
        Self { value }
    }

    pub const fn value(&self) -> i64 {
        self.value
    }
}

impl_level_score!(SimpleScore { value } => of);

impl fmt::Debug for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleScore({})", self.value)
    }
}

impl fmt::Display for SimpleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl ParseableScore for SimpleScore {
    /// Accepts a bare integer with an optional `init` suffix.
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix("init").unwrap_or(trimmed);
        digits.parse().map(Self::of).map_err(|e| ScoreParseError {
            message: format!("Invalid SimpleScore '{}': {}", digits, e),
        })
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
