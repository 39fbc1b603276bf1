//! Three-level score for problems with a distinct middle priority.

use std::fmt;

/// Levels compare hard, then medium, then soft.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardMediumSoftScore {
    hard: i64,
    medium: i64,
    soft: i64,
}

impl HardMediumSoftScore {
    #[inline]
    pub const fn of(hard: i64, medium: i64, soft: i64) -> Self {
        Self { hard, medium, soft }
    }

    pub const fn hard(&self) -> i64 {
        self.hard
    }

    pub const fn medium(&self) -> i64 {
        self.medium
    }

    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl_level_score!(HardMediumSoftScore { hard, medium, soft } => of);
impl_suffixed_parse!(
    HardMediumSoftScore { hard => "hard", medium => "medium", soft => "soft" } => of
);

impl fmt::Debug for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardMediumSoftScore({self})")
    }
}

impl fmt::Display for HardMediumSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}medium/{}soft", self.hard, self.medium, self.soft)
    }
}
