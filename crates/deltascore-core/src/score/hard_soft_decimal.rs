//! HardSoftDecimalScore - Two-level score with i64 precision and ×100000 scaling
//!
//! Fractional weights stay exact because the levels are stored as scaled
//! integers; no floating point participates in the arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::traits::{ParseableScore, ScoreParseError};

/// Scale factor for 5 decimal places of precision.
const SCALE: i64 = 100_000;
const SCALE_DIGITS: u32 = 5;

/// A hard/soft score with five decimal places, stored pre-scaled.
///
/// Use [`of`](Self::of) for whole values or [`of_scaled`](Self::of_scaled)
/// for pre-scaled values.
///
/// # Examples
///
/// ```
/// use deltascore_core::{HardSoftDecimalScore, ParseableScore};
///
/// let score = HardSoftDecimalScore::of_scaled(-150000, -250000);
/// assert_eq!(format!("{}", score), "-1.5hard/-2.5soft");
///
/// let parsed = HardSoftDecimalScore::parse("-1.5hard/-2.5soft").unwrap();
/// assert_eq!(parsed, score);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftDecimalScore {
    hard: i64,
    soft: i64,
}

impl HardSoftDecimalScore {
    /// Creates a new score from whole (unscaled) values.
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore {
            hard: hard * SCALE,
            soft: soft * SCALE,
        }
    }

    /// Creates a new score from pre-scaled values.
    #[inline]
    pub const fn of_scaled(hard: i64, soft: i64) -> Self {
        HardSoftDecimalScore { hard, soft }
    }

    /// Creates a score from exact decimals.
    ///
    /// Fails when a value carries more than five decimal places or does not
    /// fit the scaled `i64` range, instead of silently rounding.
    pub fn of_decimal(hard: Decimal, soft: Decimal) -> Result<Self, ScoreParseError> {
        Ok(HardSoftDecimalScore {
            hard: scale_exact(hard)?,
            soft: scale_exact(soft)?,
        })
    }

    /// Returns the scaled hard component.
    #[inline]
    pub const fn hard_scaled(&self) -> i64 {
        self.hard
    }

    /// Returns the scaled soft component.
    #[inline]
    pub const fn soft_scaled(&self) -> i64 {
        self.soft
    }

    /// Returns the hard component as an exact decimal.
    pub fn hard(&self) -> Decimal {
        Decimal::new(self.hard, SCALE_DIGITS).normalize()
    }

    /// Returns the soft component as an exact decimal.
    pub fn soft(&self) -> Decimal {
        Decimal::new(self.soft, SCALE_DIGITS).normalize()
    }
}

fn scale_exact(value: Decimal) -> Result<i64, ScoreParseError> {
    let scaled = value
        .checked_mul(Decimal::from(SCALE))
        .ok_or_else(|| ScoreParseError {
            message: format!("Decimal score '{}' is out of range", value),
        })?;
    if scaled.fract() != Decimal::ZERO {
        return Err(ScoreParseError {
            message: format!(
                "Decimal score '{}' has more than {} decimal places",
                value, SCALE_DIGITS
            ),
        });
    }
    scaled.to_i64().ok_or_else(|| ScoreParseError {
        message: format!("Decimal score '{}' is out of range", value),
    })
}

impl_level_score!(HardSoftDecimalScore { hard, soft } => of_scaled);

impl fmt::Debug for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftDecimalScore({}, {})", self.hard(), self.soft())
    }
}

impl fmt::Display for HardSoftDecimalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard(), self.soft())
    }
}

impl ParseableScore for HardSoftDecimalScore {
    fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (hard_part, soft_part) = s.split_once('/').ok_or_else(|| ScoreParseError {
            message: format!(
                "Invalid HardSoftDecimalScore format '{}': expected 2 parts separated by '/'",
                s
            ),
        })?;

        let parse_level = |part: &str, suffix: &str| -> Result<Decimal, ScoreParseError> {
            let part = part.trim();
            let num_str = part.strip_suffix(suffix).ok_or_else(|| ScoreParseError {
                message: format!("part '{}' must end with '{}'", part, suffix),
            })?;
            Decimal::from_str(num_str).map_err(|e| ScoreParseError {
                message: format!("Invalid {} score '{}': {}", suffix, num_str, e),
            })
        };

        let hard = parse_level(hard_part, "hard")?;
        let soft = parse_level(soft_part, "soft")?;
        HardSoftDecimalScore::of_decimal(hard, soft)
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
