//! deltascore Core - score types and shared identifiers
//!
//! This crate provides the leaf abstractions the propagation network builds on:
//! - Score types with exact, integer-backed arithmetic
//! - Constraint identification and impact direction
//! - The umbrella error type

pub mod constraint;
pub mod error;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use error::DeltaScoreError;
pub use score::{
    HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, ParseableScore, Score,
    ScoreParseError, SimpleScore,
};
