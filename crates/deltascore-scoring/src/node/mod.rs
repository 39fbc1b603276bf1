//! Node kinds of the propagation network.
//!
//! A [`NodeSpec`] is the immutable description of a node: its kind, its
//! upstream references and the functions it evaluates. The mutable per-node
//! state of one session lives in `NodeState` and is dispatched by `match`
//! in the network; the kind set is closed.

mod filter;
mod flatten;
mod group;
mod join;
mod map;
mod scorer;
mod source;

pub(crate) use group::GroupState;
pub(crate) use join::JoinState;
pub(crate) use scorer::ScorerState;

use std::fmt;
use std::sync::Arc;

use deltascore_core::{ConstraintRef, ImpactType, Score};
use smallvec::{smallvec, SmallVec};

use crate::collector::Collector;
use crate::fact::{Fact, FactStore};
use crate::tuple::{Elements, TupleArena, TupleId, TupleView};

/// Predicate evaluated by a filter node.
pub type Predicate<F> = Arc<dyn Fn(&TupleView<'_, F>) -> bool + Send + Sync>;

/// Function deriving a [`Value`](crate::Value) from a tuple (join key, group
/// key, mapper, collector extractor).
pub type ValueFn<F> = Arc<dyn Fn(&TupleView<'_, F>) -> crate::Value + Send + Sync>;

/// One-to-many expansion evaluated by a flatten node.
pub type ExpandFn<F> = Arc<dyn Fn(&TupleView<'_, F>) -> Vec<crate::Value> + Send + Sync>;

/// Integer match weight evaluated by a scoring node.
pub type MatchWeightFn<F> = Arc<dyn Fn(&TupleView<'_, F>) -> i64 + Send + Sync>;

/// Position of a node in its graph.
///
/// Ids are assigned in declaration order and every upstream reference points
/// to a smaller id, so ascending id order is a topological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    Filter,
    Join,
    Group,
    Map,
    Flatten,
    Scorer,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Filter => "filter",
            NodeKind::Join => "join",
            NodeKind::Group => "group",
            NodeKind::Map => "map",
            NodeKind::Flatten => "flatten",
            NodeKind::Scorer => "scorer",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of one node.
pub enum NodeSpec<F, Sc> {
    /// Entry point for every fact whose [`Fact::class_name`] equals `class`.
    /// Emits arity-1 tuples holding the fact reference.
    Source { class: String },
    Filter {
        upstream: NodeId,
        predicate: Predicate<F>,
    },
    /// Equality join; output elements are left elements followed by right
    /// elements. `left` and `right` may be the same node.
    Join {
        left: NodeId,
        right: NodeId,
        left_key: ValueFn<F>,
        right_key: ValueFn<F>,
    },
    /// Output tuples are `[key, aggregate]`.
    Group {
        upstream: NodeId,
        key: ValueFn<F>,
        collector: Collector<F>,
    },
    /// Output tuples are `[mapper(tuple)]`.
    Map {
        upstream: NodeId,
        mapper: ValueFn<F>,
    },
    /// Output tuples are the input elements followed by one expansion item.
    Flatten {
        upstream: NodeId,
        expand: ExpandFn<F>,
    },
    /// Terminal node adding `impact(weight × match_weight)` per live tuple.
    Scorer {
        upstream: NodeId,
        constraint: ConstraintRef,
        impact: ImpactType,
        weight: Sc,
        match_weight: Option<MatchWeightFn<F>>,
    },
}

impl<F, Sc> NodeSpec<F, Sc> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeSpec::Source { .. } => NodeKind::Source,
            NodeSpec::Filter { .. } => NodeKind::Filter,
            NodeSpec::Join { .. } => NodeKind::Join,
            NodeSpec::Group { .. } => NodeKind::Group,
            NodeSpec::Map { .. } => NodeKind::Map,
            NodeSpec::Flatten { .. } => NodeKind::Flatten,
            NodeSpec::Scorer { .. } => NodeKind::Scorer,
        }
    }

    /// Upstream references in input order (left before right for joins).
    pub fn upstreams(&self) -> SmallVec<[NodeId; 2]> {
        match self {
            NodeSpec::Source { .. } => SmallVec::new(),
            NodeSpec::Join { left, right, .. } => smallvec![*left, *right],
            NodeSpec::Filter { upstream, .. }
            | NodeSpec::Group { upstream, .. }
            | NodeSpec::Map { upstream, .. }
            | NodeSpec::Flatten { upstream, .. }
            | NodeSpec::Scorer { upstream, .. } => smallvec![*upstream],
        }
    }

    /// The constraint this node scores, for scoring nodes.
    pub fn constraint(&self) -> Option<&ConstraintRef> {
        match self {
            NodeSpec::Scorer { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

impl<F, Sc: fmt::Debug> fmt::Debug for NodeSpec<F, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSpec::Source { class } => f.debug_struct("Source").field("class", class).finish(),
            NodeSpec::Join { left, right, .. } => f
                .debug_struct("Join")
                .field("left", left)
                .field("right", right)
                .finish(),
            NodeSpec::Group {
                upstream,
                collector,
                ..
            } => f
                .debug_struct("Group")
                .field("upstream", upstream)
                .field("collector", &collector.name())
                .finish(),
            NodeSpec::Scorer {
                upstream,
                constraint,
                impact,
                weight,
                match_weight,
            } => f
                .debug_struct("Scorer")
                .field("upstream", upstream)
                .field("constraint", &constraint.full_name())
                .field("impact", impact)
                .field("weight", weight)
                .field("weighted_matches", &match_weight.is_some())
                .finish(),
            other => f
                .debug_struct(match other.kind() {
                    NodeKind::Filter => "Filter",
                    NodeKind::Map => "Map",
                    _ => "Flatten",
                })
                .field("upstream", &other.upstreams()[0])
                .finish(),
        }
    }
}

/// Event delivered to a consumer when an upstream tuple settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Insert,
    Update,
    Retract,
}

/// Per-session mutable state of a node.
pub(crate) enum NodeState<Sc> {
    /// Source, filter, map and flatten keep everything in scratch slots.
    Stateless,
    Join(JoinState),
    Group(GroupState),
    Scorer(ScorerState<Sc>),
}

/// Write access a node needs while handling one upstream event: the tuple
/// arena and its own output queue.
pub(crate) struct Outbox<'a, Sc> {
    pub(crate) tuples: &'a mut TupleArena<Sc>,
    pub(crate) queue: &'a mut Vec<TupleId>,
    pub(crate) node: NodeId,
    pub(crate) store_size: usize,
    pub(crate) live: &'a mut usize,
    pub(crate) created: &'a mut u64,
}

impl<Sc> Outbox<'_, Sc> {
    /// Creates an output tuple and queues its insert.
    pub(crate) fn insert(&mut self, elements: Elements) -> TupleId {
        let id = self.tuples.create(self.node, elements, self.store_size);
        self.queue.push(id);
        *self.live += 1;
        *self.created += 1;
        id
    }

    /// Marks an output tuple as changed.
    pub(crate) fn update(&mut self, id: TupleId) {
        let tuple = self.tuples.get_mut(id);
        let transition = tuple.state.on_update();
        tuple.state = transition.next;
        if transition.enqueue {
            self.queue.push(id);
        }
    }

    /// Marks an output tuple as removed.
    pub(crate) fn retract(&mut self, id: TupleId) {
        let tuple = self.tuples.get_mut(id);
        let transition = tuple.state.on_retract();
        tuple.state = transition.next;
        if transition.enqueue {
            self.queue.push(id);
        }
    }

    /// Replaces the elements of an output tuple and marks it as changed.
    pub(crate) fn refresh(&mut self, id: TupleId, elements: Elements) {
        self.tuples.get_mut(id).elements = elements;
        self.update(id);
    }
}

/// Delivers one settled upstream tuple to one consumer.
#[allow(clippy::too_many_arguments)]
pub(crate) fn dispatch<F: Fact, Sc: Score>(
    spec: &NodeSpec<F, Sc>,
    state: &mut NodeState<Sc>,
    input: usize,
    slot: usize,
    event: Event,
    tuple: TupleId,
    facts: &FactStore<F>,
    out: &mut Outbox<'_, Sc>,
) {
    match (spec, state) {
        (NodeSpec::Filter { predicate, .. }, NodeState::Stateless) => {
            filter::on_event(predicate, slot, event, tuple, facts, out)
        }
        (
            NodeSpec::Join {
                left_key,
                right_key,
                ..
            },
            NodeState::Join(join),
        ) => join.on_event([left_key, right_key], input, event, tuple, facts, out),
        (NodeSpec::Group { key, collector, .. }, NodeState::Group(group)) => {
            group.on_event(key, collector, event, tuple, facts, out)
        }
        (NodeSpec::Map { mapper, .. }, NodeState::Stateless) => {
            map::on_event(mapper, slot, event, tuple, facts, out)
        }
        (NodeSpec::Flatten { expand, .. }, NodeState::Stateless) => {
            flatten::on_event(expand, slot, event, tuple, facts, out)
        }
        (
            NodeSpec::Scorer {
                impact,
                match_weight,
                ..
            },
            NodeState::Scorer(scorer),
        ) => scorer.on_event(*impact, match_weight.as_ref(), event, tuple, facts, out.tuples),
        (NodeSpec::Source { .. }, _) => {
            panic!("source {} received an upstream event", out.node)
        }
        (spec, _) => panic!(
            "{} state does not match its {} spec",
            out.node,
            spec.kind()
        ),
    }
}

pub(crate) use source::{source_insert, source_retract, source_update};
