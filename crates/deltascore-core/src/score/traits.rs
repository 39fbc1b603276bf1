//! Core Score trait definition

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{Add, Neg, Sub};

/// Core trait for all score types in deltascore.
///
/// A score is a structured value with one signed integer per level, highest
/// priority first. The propagation network only ever adds, subtracts, negates
/// and multiplies scores by integer match weights, so every implementation
/// must make those operations exact.
///
/// When comparing scores, higher-priority levels are compared first.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + Hash
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// The additive identity.
    fn zero() -> Self;

    /// Multiplies every level by an integer match weight.
    fn multiply(&self, factor: i64) -> Self;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// Marker trait for scores that can be parsed from a string.
pub trait ParseableScore: Score {
    /// Parses a score from a string representation.
    ///
    /// # Format
    /// - SimpleScore: "42" or "42init"
    /// - HardSoftScore: "0hard/-100soft"
    /// - HardMediumSoftScore: "0hard/0medium/-100soft"
    /// - HardSoftDecimalScore: "-1.5hard/0soft"
    fn parse(s: &str) -> Result<Self, ScoreParseError>;

    /// Returns the string representation accepted by [`ParseableScore::parse`].
    fn to_string_repr(&self) -> String;
}

/// Error when parsing a score from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

/// Parses one `"<n><suffix>"` level of a slash-separated score.
pub(crate) fn parse_suffixed(
    type_name: &str,
    input: &str,
    part: Option<&str>,
    suffix: &str,
) -> Result<i64, ScoreParseError> {
    let part = part.map(str::trim).ok_or_else(|| ScoreParseError {
        message: format!("{} '{}' is missing its {} level", type_name, input, suffix),
    })?;
    let digits = part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
        message: format!("level '{}' of {} must end with '{}'", part, type_name, suffix),
    })?;
    digits.parse::<i64>().map_err(|e| ScoreParseError {
        message: format!("Invalid {} level '{}': {}", suffix, digits, e),
    })
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Score parse error: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}
