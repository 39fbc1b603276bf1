//! Core constraint types.
//!
//! Constraint identification and the direction in which a constraint moves
//! the score.

use std::fmt;

use crate::score::Score;

/// Reference to a constraint for identification.
///
/// # Example
///
/// ```
/// use deltascore_core::ConstraintRef;
///
/// let cr = ConstraintRef::new("meetings", "Room conflict");
/// assert_eq!(cr.full_name(), "meetings/Room conflict");
///
/// let simple = ConstraintRef::new("", "Room conflict");
/// assert_eq!(simple.full_name(), "Room conflict");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintRef {
    /// Package/module containing the constraint.
    pub package: String,
    /// Name of the constraint.
    pub name: String,
}

impl ConstraintRef {
    /// Creates a new constraint reference.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Returns the fully qualified name.
    pub fn full_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Type of impact a constraint has on the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactType {
    /// Penalize (subtract from score).
    Penalty,
    /// Reward (add to score).
    Reward,
}

impl ImpactType {
    /// Signs a non-negative weight according to the impact direction.
    ///
    /// ```
    /// use deltascore_core::{ImpactType, SimpleScore};
    ///
    /// assert_eq!(ImpactType::Penalty.apply(SimpleScore::of(3)), SimpleScore::of(-3));
    /// assert_eq!(ImpactType::Reward.apply(SimpleScore::of(3)), SimpleScore::of(3));
    /// ```
    #[inline]
    pub fn apply<Sc: Score>(self, weight: Sc) -> Sc {
        match self {
            ImpactType::Penalty => -weight,
            ImpactType::Reward => weight,
        }
    }
}
