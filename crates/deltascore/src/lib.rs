//! deltascore - Incremental constraint scoring in Rust
//!
//! Declare constraints once as a graph, then let a session keep the score
//! up to date while facts are inserted, changed and retracted.
//!
//! # Example
//!
//! ```rust
//! use deltascore::prelude::*;
//!
//! enum Timetable {
//!     Lesson { room: i64 },
//! }
//!
//! impl deltascore::Fact for Timetable {
//!     fn class_name(&self) -> &'static str {
//!         "Lesson"
//!     }
//! }
//!
//! fn room(t: &TupleView<'_, Timetable>) -> i64 {
//!     match t.fact(0) {
//!         Timetable::Lesson { room } => *room,
//!     }
//! }
//!
//! let mut builder = GraphBuilder::<Timetable, HardSoftScore>::new();
//! let lessons = builder.for_each("Lesson");
//! let shared = builder.join(lessons, lessons, room, room);
//! let shared = builder.filter(shared, |t| t.handle(0) < t.handle(1));
//! builder.penalize(shared, "Room conflict", HardSoftScore::of_hard(1));
//!
//! let mut session = ScoreSession::new(builder.build()?, &SessionConfig::default())?;
//! session.insert(Timetable::Lesson { room: 1 });
//! let second = session.insert(Timetable::Lesson { room: 1 });
//! assert_eq!(session.calculate_score(), HardSoftScore::of_hard(-1));
//!
//! session.retract(second)?;
//! assert_eq!(session.calculate_score(), HardSoftScore::zero());
//! # Ok::<(), deltascore::DeltaScoreError>(())
//! ```

// Score types
pub use deltascore_core::{
    ConstraintRef, DeltaScoreError, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore,
    ImpactType, ParseableScore, Score, SimpleScore,
};

// Configuration
pub use deltascore_config::{ConfigError, EnvironmentMode, SessionConfig};

// Graph declaration
pub use deltascore_scoring::collector;
pub use deltascore_scoring::{
    ConstraintGraph, Fact, FactHandle, GraphBuilder, GraphError, NodeId, NodeKind, NodeSpec,
    TupleView, Value,
};

// Sessions and analysis
pub use deltascore_scoring::{
    ConstraintAnalysis, ConstraintMatch, ConstraintScore, ConstraintWeightOverrides,
    ScoreExplanation, ScoreSession, SessionError, SessionStats, WeightProvider,
};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::collector::{average, count, count_distinct, max, min, sum, to_list};
    pub use super::{
        HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::{ConstraintRef, SessionConfig};
    pub use super::{GraphBuilder, ScoreSession, TupleView, Value};
}
