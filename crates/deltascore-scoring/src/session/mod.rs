//! Incremental score sessions.
//!
//! A [`ScoreSession`] owns the facts being scored and one propagation
//! network over a shared [`ConstraintGraph`]. Fact changes are cheap: they
//! only mark the affected source tuples. [`ScoreSession::calculate_score`]
//! flushes the pending work through the network and returns the total.

mod error;


pub use error::{Result, SessionError};

use std::sync::Arc;
use std::time::{Duration, Instant};

use deltascore_config::{ConfigError, EnvironmentMode, SessionConfig};
use deltascore_core::{ConstraintRef, ParseableScore, Score};
use tracing::{debug, info, warn};

use crate::analysis::{ConstraintAnalysis, ConstraintMatch, ConstraintScore, ScoreExplanation};
use crate::fact::{Fact, FactHandle, FactStore};
use crate::graph::ConstraintGraph;
use crate::network::Network;
use crate::node::{NodeId, NodeSpec};
use crate::weight_overrides::{ConstraintWeightOverrides, WeightProvider};

/// Counters accumulated over the lifetime of a session's network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Flushes that had pending work.
    pub flush_count: u64,
    /// Events delivered from a producer to a consumer.
    pub events_propagated: u64,
    /// Tuples allocated, at every node.
    pub tuples_created: u64,
    /// Tuples retracted before they were ever propagated.
    pub tuples_aborted: u64,
}

/// Incremental scorer over a mutable set of facts.
///
/// # Example
///
/// ```
/// use deltascore_config::SessionConfig;
/// use deltascore_core::SimpleScore;
/// use deltascore_scoring::{Fact, GraphBuilder, ScoreSession};
///
/// #[derive(Clone)]
/// struct Visit { day: i64 }
///
/// impl Fact for Visit {
///     fn class_name(&self) -> &'static str { "Visit" }
/// }
///
/// let mut builder = GraphBuilder::<Visit, SimpleScore>::new();
/// let visits = builder.for_each("Visit");
/// let same_day = builder.join(visits, visits, |t| t.fact(0).day, |t| t.fact(0).day);
/// builder.penalize(same_day, "Same day", SimpleScore::of(1));
///
/// let mut session = ScoreSession::new(builder.build().unwrap(), &SessionConfig::default()).unwrap();
/// let monday = session.insert(Visit { day: 1 });
/// assert_eq!(session.calculate_score(), SimpleScore::of(-1));
///
/// session.insert(Visit { day: 1 });
/// assert_eq!(session.calculate_score(), SimpleScore::of(-4));
///
/// session.modify(monday, |v| v.day = 2).unwrap();
/// assert_eq!(session.calculate_score(), SimpleScore::of(-2));
/// ```
pub struct ScoreSession<F, Sc> {
    facts: FactStore<F>,
    network: Network<F, Sc>,
    environment_mode: EnvironmentMode,
    tuple_capacity: usize,
    stats: SessionStats,
}

impl<F: Fact, Sc: Score> ScoreSession<F, Sc> {
    /// Creates a session, applying the config's weight overrides.
    ///
    /// Fails when a configured weight does not parse. Overrides naming no
    /// constraint of the graph are logged and ignored.
    pub fn new(
        graph: Arc<ConstraintGraph<F, Sc>>,
        config: &SessionConfig,
    ) -> std::result::Result<Self, ConfigError>
    where
        Sc: ParseableScore,
    {
        let overrides = ConstraintWeightOverrides::<Sc>::from_config(config)?;
        for name in overrides.names() {
            let known = graph
                .constraint_refs()
                .any(|c| c.name == name || c.full_name() == name);
            if !known {
                warn!(event = "unknown_weight_override", constraint = name);
            }
        }
        Ok(Self::with_weights(graph, config, &overrides))
    }

    /// Creates a session whose constraint weights come from `weights`,
    /// falling back to the weight each scoring node was declared with.
    pub fn with_weights(
        graph: Arc<ConstraintGraph<F, Sc>>,
        config: &SessionConfig,
        weights: &impl WeightProvider<Sc>,
    ) -> Self {
        let resolved = resolve_weights(&graph, weights);
        let tuple_capacity = config.tuple_capacity.unwrap_or(0);

        info!(
            event = "session_start",
            node_count = graph.node_count(),
            constraint_count = graph.constraint_count(),
            environment_mode = %config.environment_mode,
        );

        Self {
            facts: FactStore::new(),
            network: Network::new(graph, resolved, tuple_capacity),
            environment_mode: config.environment_mode,
            tuple_capacity,
            stats: SessionStats::default(),
        }
    }

    /// Adds a fact and returns its handle.
    ///
    /// Facts whose class has no source node are stored but never matched.
    pub fn insert(&mut self, fact: F) -> FactHandle {
        let class = fact.class_name();
        let handle = self.facts.insert(fact);
        self.network.insert_fact(handle, class);
        handle
    }

    /// Replaces the value of a live fact; its handle stays the same.
    pub fn update(&mut self, handle: FactHandle, fact: F) -> Result<()> {
        let current = self
            .facts
            .get(handle)
            .ok_or(SessionError::UnknownFact(handle))?;
        let (from, to) = (current.class_name(), fact.class_name());
        if from != to {
            return Err(SessionError::ClassChanged { handle, from, to });
        }
        self.facts.replace(handle, fact);
        self.network.update_fact(handle);
        Ok(())
    }

    /// Mutates a live fact in place.
    ///
    /// If the mutation changes the fact's class, the fact moves to the
    /// source nodes of its new class under the same handle.
    pub fn modify<R>(&mut self, handle: FactHandle, f: impl FnOnce(&mut F) -> R) -> Result<R> {
        let fact = self
            .facts
            .get_mut(handle)
            .ok_or(SessionError::UnknownFact(handle))?;
        let from = fact.class_name();
        let result = f(fact);
        let to = fact.class_name();
        if from == to {
            self.network.update_fact(handle);
        } else {
            debug!(event = "reroute", fact = %handle, from, to);
            self.network.reroute_fact(handle, to);
        }
        Ok(result)
    }

    /// Removes a live fact and hands it back.
    ///
    /// The fact leaves the store immediately, while the tuples derived from
    /// it are only retracted on the next flush. Until then a
    /// [`Value::Fact`](crate::value::Value::Fact)
    /// copied into a map output or a group key still names the old handle,
    /// so functions reading such elements should use
    /// [`TupleView::try_fact`](crate::tuple::TupleView::try_fact).
    pub fn retract(&mut self, handle: FactHandle) -> Result<F> {
        let fact = self
            .facts
            .remove(handle)
            .ok_or(SessionError::UnknownFact(handle))?;
        self.network.retract_fact(handle);
        Ok(fact)
    }

    /// Propagates every pending change and returns the total score.
    ///
    /// In `fast_assert` and `full_assert` modes the network is checked
    /// after the flush; a violation panics.
    pub fn calculate_score(&mut self) -> Sc {
        if self.network.has_pending() {
            let start = Instant::now();
            let report = self.network.flush(&self.facts);
            self.stats.flush_count += 1;
            self.stats.events_propagated += report.propagated;
            self.stats.tuples_aborted += report.aborted;
            debug!(
                event = "flush",
                settled = report.settled,
                propagated = report.propagated,
                aborted = report.aborted,
                elapsed_us = saturating_micros(start.elapsed()),
                score = %self.network.score(),
            );
        }

        if self.environment_mode.is_asserted() {
            self.network.assert_consistent();
        }
        if self.environment_mode.is_fully_asserted() {
            self.network.assert_matches_rebuild(&self.facts);
        }
        self.network.score()
    }

    /// Per-constraint tallies, in graph declaration order.
    pub fn constraint_scores(&mut self) -> Vec<ConstraintScore<Sc>> {
        self.calculate_score();
        self.network
            .tallies()
            .into_iter()
            .map(|tally| ConstraintScore {
                constraint_ref: self.constraint_of(tally.node).clone(),
                weight: tally.weight,
                score: tally.score,
                match_count: tally.match_count,
            })
            .collect()
    }

    /// Live matches of one constraint with their contributions.
    pub fn constraint_matches(
        &mut self,
        constraint: &ConstraintRef,
    ) -> Result<Vec<ConstraintMatch<Sc>>> {
        let node = self
            .graph()
            .find_constraint(constraint)
            .ok_or_else(|| SessionError::UnknownConstraint(constraint.clone()))?;
        self.calculate_score();
        Ok(self.matches_of(node, constraint))
    }

    /// Total score with a per-constraint breakdown and every live match.
    pub fn explain(&mut self) -> ScoreExplanation<Sc> {
        let score = self.calculate_score();
        let analyses = self
            .network
            .tallies()
            .into_iter()
            .map(|tally| {
                let constraint_ref = self.constraint_of(tally.node).clone();
                ConstraintAnalysis {
                    matches: self.matches_of(tally.node, &constraint_ref),
                    constraint_ref,
                    weight: tally.weight,
                    score: tally.score,
                }
            })
            .collect();
        ScoreExplanation::new(score, analyses)
    }

    fn matches_of(&self, node: NodeId, constraint: &ConstraintRef) -> Vec<ConstraintMatch<Sc>> {
        self.network
            .matches(node)
            .into_iter()
            .map(|(elements, score)| ConstraintMatch {
                constraint_ref: constraint.clone(),
                score,
                elements,
            })
            .collect()
    }

    fn constraint_of(&self, node: NodeId) -> &ConstraintRef {
        match self.graph().node(node) {
            NodeSpec::Scorer { constraint, .. } => constraint,
            _ => panic!("{} is not a scoring node", node),
        }
    }

    /// Discards all node state and replays the live facts through a fresh
    /// network. Pending changes are folded into the replay.
    pub fn reset(&mut self) {
        let graph = Arc::clone(self.network.graph());
        let weights = self.network.weights().to_vec();
        self.network = Network::replay(graph, weights, self.tuple_capacity, &self.facts);
        self.stats = SessionStats::default();
        debug!(event = "reset", fact_count = self.facts.len());
    }

    /// Builds an independent session over the same graph, weights and
    /// facts. Handles issued by this session stay valid in the new one.
    pub fn rebuild(&self) -> Self
    where
        F: Clone,
    {
        let facts = self.facts.clone();
        let network = Network::replay(
            Arc::clone(self.network.graph()),
            self.network.weights().to_vec(),
            self.tuple_capacity,
            &facts,
        );
        Self {
            facts,
            network,
            environment_mode: self.environment_mode,
            tuple_capacity: self.tuple_capacity,
            stats: SessionStats::default(),
        }
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            tuples_created: self.network.tuples_created(),
            ..self.stats
        }
    }

    pub fn graph(&self) -> &Arc<ConstraintGraph<F, Sc>> {
        self.network.graph()
    }

    pub fn environment_mode(&self) -> EnvironmentMode {
        self.environment_mode
    }

    /// Returns the live fact behind `handle`.
    pub fn fact(&self, handle: FactHandle) -> Option<&F> {
        self.facts.get(handle)
    }

    pub fn facts(&self) -> impl Iterator<Item = (FactHandle, &F)> + '_ {
        self.facts.iter()
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Live tuples produced by `node`, as of the last flush.
    pub fn live_tuple_count(&self, node: NodeId) -> usize {
        self.network.live_tuple_count(node)
    }

    /// Tuples currently allocated across all nodes.
    pub fn tuple_count(&self) -> usize {
        self.network.tuple_count()
    }
}

/// Whole microseconds in `elapsed`, clamped to `u64::MAX`.
fn saturating_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

fn resolve_weights<F, Sc: Score>(
    graph: &ConstraintGraph<F, Sc>,
    provider: &impl WeightProvider<Sc>,
) -> Vec<Sc> {
    graph
        .scorers()
        .iter()
        .map(|&id| match graph.node(id) {
            NodeSpec::Scorer {
                constraint, weight, ..
            } => {
                let effective = provider.weight_for(constraint, *weight);
                if effective != *weight {
                    info!(
                        event = "weight_override",
                        constraint = %constraint,
                        declared = %weight,
                        weight = %effective,
                    );
                }
                effective
            }
            _ => panic!("{} is not a scoring node", id),
        })
        .collect()
}
