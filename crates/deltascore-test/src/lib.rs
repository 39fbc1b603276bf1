//! Shared test fixtures for deltascore crates.
//!
//! - [`meeting`] - Meeting scheduling facts (`MeetingFact` and its classes)
//! - [`constraints`] - Ready-made constraint graphs over meeting facts
//! - [`reference`] - Brute-force scoring used as ground truth
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! deltascore-test = { workspace = true }
//! ```
//!
//! This crate depends on `deltascore-scoring`, so `deltascore-scoring` may
//! only use it from its `tests/` directory: unit tests compile a second copy
//! of the crate whose types would not line up.
//!
//! ```ignore
//! use deltascore_test::constraints::meeting_graph;
//! use deltascore_test::meeting::{MeetingAssignment, MeetingFact};
//! use deltascore_test::reference::reference_score;
//! ```

pub mod constraints;
pub mod meeting;
pub mod reference;

// Re-export commonly used types at crate root for convenience
pub use constraints::meeting_graph;
pub use meeting::{Attendance, MeetingAssignment, MeetingFact, Room};
pub use reference::{reference_constraint_scores, reference_score};
