//! Incremental tuple-propagation scoring for deltascore.
//!
//! This crate evaluates a weighted constraint score over a mutable set of
//! facts without recomputing the whole model after every change:
//! - A compiled [`ConstraintGraph`] of source, filter, join, group, map,
//!   flatten and scoring nodes, shared between sessions
//! - A [`ScoreSession`] that turns fact inserts, updates and retractions into
//!   tuple lifecycle events and settles them on [`ScoreSession::calculate_score`]
//! - Exact running tallies per constraint, with analysis and justification
//!
//! # Architecture
//!
//! The node set is closed: per-node state is an enum dispatched by `match`.
//! Tuples live in a generational arena and carry one scratch slot per
//! consumer of their producer, fixed when the graph is compiled. Pending
//! tuples wait in per-node queues that a flush drains in node id order.

// Node functions are stored as `Arc<dyn Fn>` aliases over tuple views.
#![allow(clippy::type_complexity)]

pub mod analysis;
pub mod collector;
pub mod fact;
pub mod graph;
mod network;
pub mod node;
pub mod session;
pub mod tuple;
pub mod value;
pub mod weight_overrides;

// ============================================================================
// Facts and values
// ============================================================================

pub use fact::{Fact, FactHandle, FactStore};
pub use value::Value;

// ============================================================================
// Graph
// ============================================================================

pub use collector::{Accumulator, Collector};
pub use graph::{ConstraintGraph, Consumer, GraphBuilder, GraphError};
pub use node::{ExpandFn, MatchWeightFn, NodeId, NodeKind, NodeSpec, Predicate, ValueFn};
pub use tuple::{TupleId, TupleState, TupleView};

// ============================================================================
// Sessions
// ============================================================================

pub use session::{ScoreSession, SessionError, SessionStats};
pub use weight_overrides::{ConstraintWeightOverrides, WeightProvider};

// ============================================================================
// Analysis (for score explanation)
// ============================================================================

pub use analysis::{ConstraintAnalysis, ConstraintMatch, ConstraintScore, ScoreExplanation};
