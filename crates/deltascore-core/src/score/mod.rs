//! Score types for representing solution quality
//!
//! Every score type is backed by `i64` levels (the decimal score uses a fixed
//! scale), so the running totals kept by the propagation network add and
//! subtract exactly: a balanced insert/retract pair always restores the
//! previous value bit for bit.

#[macro_use]
mod macros;

mod hard_medium_soft;
mod hard_soft;
mod hard_soft_decimal;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use hard_medium_soft::HardMediumSoftScore;
pub use hard_soft::HardSoftScore;
pub use hard_soft_decimal::HardSoftDecimalScore;
pub use simple::SimpleScore;
pub use traits::{ParseableScore, Score, ScoreParseError};
