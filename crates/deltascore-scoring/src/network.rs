//! The propagation network of one session.
//!
//! Holds the tuple arena, the per-node state and the per-node pending
//! queues. Fact changes only enqueue work at the source nodes; [`flush`]
//! drains the queues in node id order, which is a topological order, so
//! every queue is drained exactly once and after all of its upstreams.
//!
//! [`flush`]: Network::flush

use std::fmt::Write as _;
use std::mem;
use std::sync::Arc;

use deltascore_core::{ConstraintRef, Score};
use smallvec::SmallVec;
use tracing::trace;

use crate::fact::{Fact, FactHandle, FactStore};
use crate::graph::ConstraintGraph;
use crate::node::{
    self, source_insert, source_retract, source_update, Event, GroupState, JoinState, NodeId,
    NodeSpec, NodeState, Outbox, ScorerState,
};
use crate::tuple::{Propagation, Scratch, TupleArena, TupleId, TupleState};
use crate::value::Value;

/// Work done by one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FlushReport {
    /// Tuples settled.
    pub(crate) settled: u64,
    /// Events delivered to consumers.
    pub(crate) propagated: u64,
    /// Tuples dropped without ever being propagated.
    pub(crate) aborted: u64,
}

/// Running tally of one scoring node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tally<Sc> {
    pub(crate) node: NodeId,
    pub(crate) weight: Sc,
    pub(crate) score: Sc,
    pub(crate) match_count: usize,
}

pub(crate) struct Network<F, Sc> {
    graph: Arc<ConstraintGraph<F, Sc>>,
    weights: Vec<Sc>,
    tuples: TupleArena<Sc>,
    states: Vec<NodeState<Sc>>,
    queues: Vec<Vec<TupleId>>,
    /// Live tuples per producing node.
    live: Vec<usize>,
    /// Source tuples per fact, indexed by handle slot.
    fact_tuples: Vec<SmallVec<[TupleId; 1]>>,
    tuples_created: u64,
}

impl<F: Fact, Sc: Score> Network<F, Sc> {
    /// Creates an empty network. `weights` holds the effective weight of
    /// every scoring node, in `graph.scorers()` order.
    pub(crate) fn new(graph: Arc<ConstraintGraph<F, Sc>>, weights: Vec<Sc>, capacity: usize) -> Self {
        assert_eq!(
            weights.len(),
            graph.scorers().len(),
            "one weight per scoring node"
        );
        let mut scorer_weights = weights.iter().copied();
        let states = graph
            .nodes()
            .map(|(id, spec)| {
                let slots = graph.input_slots(id);
                match spec {
                    NodeSpec::Join { .. } => NodeState::Join(JoinState::new(slots[0], slots[1])),
                    NodeSpec::Group { .. } => NodeState::Group(GroupState::new(slots[0])),
                    NodeSpec::Scorer { .. } => {
                        let weight = scorer_weights.next().unwrap_or_else(Sc::zero);
                        NodeState::Scorer(ScorerState::new(slots[0], weight))
                    }
                    _ => NodeState::Stateless,
                }
            })
            .collect();
        let node_count = graph.node_count();
        Self {
            graph,
            weights,
            tuples: TupleArena::with_capacity(capacity),
            states,
            queues: vec![Vec::new(); node_count],
            live: vec![0; node_count],
            fact_tuples: Vec::new(),
            tuples_created: 0,
        }
    }

    /// Builds a network and loads every fact of `facts` into it, flushed.
    pub(crate) fn replay(
        graph: Arc<ConstraintGraph<F, Sc>>,
        weights: Vec<Sc>,
        capacity: usize,
        facts: &FactStore<F>,
    ) -> Self {
        let mut network = Self::new(graph, weights, capacity);
        for (handle, fact) in facts.iter() {
            network.insert_fact(handle, fact.class_name());
        }
        network.flush(facts);
        network
    }

    pub(crate) fn graph(&self) -> &Arc<ConstraintGraph<F, Sc>> {
        &self.graph
    }

    pub(crate) fn weights(&self) -> &[Sc] {
        &self.weights
    }

    pub(crate) fn tuples_created(&self) -> u64 {
        self.tuples_created
    }

    /// Emits a `Creating` tuple at every source node of `class`.
    pub(crate) fn insert_fact(&mut self, handle: FactHandle, class: &str) {
        let index = handle.index();
        if self.fact_tuples.len() <= index {
            self.fact_tuples.resize_with(index + 1, SmallVec::new);
        }
        debug_assert!(
            self.fact_tuples[index].is_empty(),
            "{} already has source tuples",
            handle
        );
        for &source in self.graph.sources_for(class) {
            let n = source.index();
            let mut out = Outbox {
                tuples: &mut self.tuples,
                queue: &mut self.queues[n],
                node: source,
                store_size: self.graph.store_size(source),
                live: &mut self.live[n],
                created: &mut self.tuples_created,
            };
            let id = source_insert(handle, &mut out);
            self.fact_tuples[index].push(id);
        }
    }

    pub(crate) fn update_fact(&mut self, handle: FactHandle) {
        let Some(ids) = self.fact_tuples.get(handle.index()) else {
            return;
        };
        for &id in ids {
            let source = self.tuples.get(id).producer();
            let n = source.index();
            let mut out = Outbox {
                tuples: &mut self.tuples,
                queue: &mut self.queues[n],
                node: source,
                store_size: self.graph.store_size(source),
                live: &mut self.live[n],
                created: &mut self.tuples_created,
            };
            source_update(id, &mut out);
        }
    }

    pub(crate) fn retract_fact(&mut self, handle: FactHandle) {
        let ids = match self.fact_tuples.get_mut(handle.index()) {
            Some(ids) => mem::take(ids),
            None => return,
        };
        for id in ids {
            let source = self.tuples.get(id).producer();
            let n = source.index();
            let mut out = Outbox {
                tuples: &mut self.tuples,
                queue: &mut self.queues[n],
                node: source,
                store_size: self.graph.store_size(source),
                live: &mut self.live[n],
                created: &mut self.tuples_created,
            };
            source_retract(id, &mut out);
        }
    }

    /// Moves a fact whose class changed to the sources of its new class.
    pub(crate) fn reroute_fact(&mut self, handle: FactHandle, class: &str) {
        self.retract_fact(handle);
        self.insert_fact(handle, class);
    }

    /// Returns true while any queue holds work.
    pub(crate) fn has_pending(&self) -> bool {
        self.queues.iter().any(|queue| !queue.is_empty())
    }

    /// Settles every pending tuple, node by node in topological order.
    pub(crate) fn flush(&mut self, facts: &FactStore<F>) -> FlushReport {
        let mut report = FlushReport::default();
        for index in 0..self.queues.len() {
            let queue = mem::take(&mut self.queues[index]);
            if queue.is_empty() {
                continue;
            }
            let producer = NodeId::new(index);
            trace!(
                event = "drain",
                node = index,
                kind = %self.graph.kind(producer),
                drained = queue.len(),
            );
            for id in queue {
                let tuple = self.tuples.get_mut(id);
                let (next, propagation) = tuple.state.settle();
                tuple.state = next;
                report.settled += 1;

                let event = match propagation {
                    Propagation::Insert => Some(Event::Insert),
                    Propagation::Update => Some(Event::Update),
                    Propagation::Retract => Some(Event::Retract),
                    Propagation::Abort => None,
                };
                match event {
                    Some(event) => {
                        for consumer in self.graph.consumers(producer) {
                            let c = consumer.node.index();
                            let mut out = Outbox {
                                tuples: &mut self.tuples,
                                queue: &mut self.queues[c],
                                node: consumer.node,
                                store_size: self.graph.store_size(consumer.node),
                                live: &mut self.live[c],
                                created: &mut self.tuples_created,
                            };
                            node::dispatch(
                                self.graph.node(consumer.node),
                                &mut self.states[c],
                                consumer.input,
                                consumer.slot,
                                event,
                                id,
                                facts,
                                &mut out,
                            );
                            report.propagated += 1;
                        }
                    }
                    None => report.aborted += 1,
                }

                if next == TupleState::Dead {
                    self.tuples.free(id);
                    self.live[index] -= 1;
                }
            }
        }
        report
    }

    /// Sum of every scoring node's tally.
    pub(crate) fn score(&self) -> Sc {
        self.scorers()
            .fold(Sc::zero(), |total, (_, scorer)| total + scorer.score())
    }

    pub(crate) fn tallies(&self) -> Vec<Tally<Sc>> {
        self.scorers()
            .map(|(node, scorer)| Tally {
                node,
                weight: scorer.weight(),
                score: scorer.score(),
                match_count: scorer.match_count(),
            })
            .collect()
    }

    /// Live matches of one scoring node with their contributions, in
    /// match order.
    pub(crate) fn matches(&self, node: NodeId) -> Vec<(Vec<Value>, Sc)> {
        match &self.states[node.index()] {
            NodeState::Scorer(scorer) => scorer
                .matches()
                .map(|id| {
                    (
                        self.tuples.get(id).elements().to_vec(),
                        scorer.contribution_of(id, &self.tuples),
                    )
                })
                .collect(),
            _ => panic!("{} is not a scoring node", node),
        }
    }

    pub(crate) fn live_tuple_count(&self, node: NodeId) -> usize {
        self.live[node.index()]
    }

    pub(crate) fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    fn scorers(&self) -> impl Iterator<Item = (NodeId, &ScorerState<Sc>)> + '_ {
        self.graph.scorers().iter().map(move |&id| match &self.states[id.index()] {
            NodeState::Scorer(scorer) => (id, scorer),
            _ => panic!("{} is not a scoring node", id),
        })
    }

    /// Verifies the structural invariants of a flushed network.
    ///
    /// # Panics
    /// Panics with a description of the first violated invariant.
    pub(crate) fn assert_consistent(&self) {
        assert!(!self.has_pending(), "queues not empty after flush");

        let mut per_node = vec![0usize; self.live.len()];
        for (id, tuple) in self.tuples.iter() {
            assert_eq!(
                tuple.state(),
                TupleState::Ok,
                "{} of {} left in a transient state",
                id,
                tuple.producer()
            );
            per_node[tuple.producer().index()] += 1;
        }
        assert_eq!(per_node, self.live, "live tuple counts drifted");

        for (id, spec) in self.graph.nodes() {
            match (&self.states[id.index()], spec) {
                (NodeState::Join(join), _) => self.assert_join(id, join),
                (NodeState::Group(group), NodeSpec::Group { collector, .. }) => {
                    for (key, bucket) in group.buckets() {
                        assert!(!bucket.members.is_empty(), "{} has an empty bucket {}", id, key);
                        let mut fresh = collector.create_accumulator();
                        for &member in &bucket.members {
                            match self.tuples.get(member).slot(group.slot()) {
                                Scratch::Group { key: member_key, extracted } => {
                                    assert_eq!(member_key, key, "{} member filed under wrong key", id);
                                    fresh.accumulate(extracted);
                                }
                                _ => panic!("{} member {} has no group membership", id, member),
                            }
                        }
                        let result = fresh.result();
                        assert_eq!(
                            bucket.accumulator.result(),
                            result,
                            "{} aggregate for {} drifted",
                            id,
                            key
                        );
                        let output = self.tuples.get(bucket.output);
                        assert_eq!(output.elements(), [key.clone(), result], "{} output is stale", id);
                    }
                    assert_eq!(group.len(), self.live[id.index()], "{} bucket count", id);
                }
                (NodeState::Scorer(scorer), _) => {
                    let sum = scorer
                        .matches()
                        .fold(Sc::zero(), |acc, m| acc + scorer.contribution_of(m, &self.tuples));
                    assert_eq!(sum, scorer.score(), "{} tally drifted from its matches", id);
                    let upstream = spec.upstreams()[0];
                    assert_eq!(
                        scorer.match_count(),
                        self.live[upstream.index()],
                        "{} does not hold every live upstream tuple",
                        id
                    );
                }
                _ => {}
            }
        }
    }

    fn assert_join(&self, id: NodeId, join: &JoinState) {
        for (side, key, members) in join.buckets() {
            assert!(!members.is_empty(), "{} has an empty index bucket {}", id, key);
            for &member in members {
                match self.tuples.get(member).slot(join.slot(side)) {
                    Scratch::JoinSide { key: member_key, .. } => {
                        assert_eq!(member_key, key, "{} member indexed under wrong key", id)
                    }
                    _ => panic!("{} member {} has no join membership", id, member),
                }
            }
        }
        assert_eq!(
            join.expected_matches(),
            self.live[id.index()],
            "{} output is not the equal-key cross product",
            id
        );
    }

    /// Compares every tally with a network rebuilt from `facts`.
    ///
    /// # Panics
    /// Panics with a per-constraint diff when any tally differs.
    pub(crate) fn assert_matches_rebuild(&self, facts: &FactStore<F>) {
        let fresh = Self::replay(
            Arc::clone(&self.graph),
            self.weights.clone(),
            self.tuples.len(),
            facts,
        );
        let expected = fresh.tallies();
        let actual = self.tallies();
        if expected == actual {
            return;
        }

        let mut diff = String::new();
        for (want, got) in expected.iter().zip(&actual) {
            if want != got {
                let _ = writeln!(
                    diff,
                    "  {}: incremental {} ({} matches), rebuilt {} ({} matches)",
                    self.constraint_of(got.node),
                    got.score,
                    got.match_count,
                    want.score,
                    want.match_count
                );
            }
        }
        panic!(
            "score corruption: incremental {} differs from rebuilt {}\n{}",
            self.score(),
            fresh.score(),
            diff
        );
    }

    fn constraint_of(&self, node: NodeId) -> &ConstraintRef {
        match self.graph.node(node).constraint() {
            Some(constraint) => constraint,
            None => panic!("{} is not a scoring node", node),
        }
    }
}
