//! Hard/soft score: the usual shape for scheduling problems.

use std::fmt;

/// Hard level first, soft level as the tie-breaker.
///
/// ```
/// use deltascore_core::HardSoftScore;
///
/// let broken = HardSoftScore::of(-1, 0);
/// let costly = HardSoftScore::of(0, -500);
/// assert!(costly > broken);
/// assert_eq!(broken.to_string(), "-1hard/0soft");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardSoftScore {
    hard: i64,
    soft: i64,
}

impl HardSoftScore {
    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        Self { hard, soft }
    }

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        Self::of(hard, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        Self::of(0, soft)
    }

    pub const fn hard(&self) -> i64 {
        self.hard
    }

    pub const fn soft(&self) -> i64 {
        self.soft
    }
}

impl_level_score!(HardSoftScore { hard, soft } => of);
impl_suffixed_parse!(HardSoftScore { hard => "hard", soft => "soft" } => of);

impl fmt::Debug for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HardSoftScore({self})")
    }
}

impl fmt::Display for HardSoftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}
