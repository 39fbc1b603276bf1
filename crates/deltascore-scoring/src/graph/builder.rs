//! Assembles node lists for [`ConstraintGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use deltascore_core::{ConstraintRef, ImpactType, Score};

use super::{ConstraintGraph, GraphError};
use crate::collector::Collector;
use crate::fact::Fact;
use crate::node::{MatchWeightFn, NodeId, NodeSpec};
use crate::tuple::TupleView;
use crate::value::Value;

/// Appends nodes in declaration order and hands back their ids.
///
/// The builder makes no topology decisions of its own except that
/// [`for_each`](Self::for_each) returns the same source node for repeated
/// requests of one class.
///
/// # Example
///
/// ```
/// use deltascore_scoring::{Fact, GraphBuilder, ScoreSession};
/// use deltascore_config::SessionConfig;
/// use deltascore_core::SimpleScore;
///
/// struct Task { done: bool }
///
/// impl Fact for Task {
///     fn class_name(&self) -> &'static str { "Task" }
/// }
///
/// let mut builder = GraphBuilder::<Task, SimpleScore>::with_package("todo");
/// let tasks = builder.for_each("Task");
/// let open = builder.filter(tasks, |t| !t.fact(0).done);
/// builder.penalize(open, "Open task", SimpleScore::of(1));
/// let graph = builder.build().unwrap();
///
/// let mut session = ScoreSession::new(graph, &SessionConfig::default()).unwrap();
/// session.insert(Task { done: false });
/// session.insert(Task { done: true });
/// assert_eq!(session.calculate_score(), SimpleScore::of(-1));
/// ```
pub struct GraphBuilder<F, Sc> {
    package: String,
    nodes: Vec<NodeSpec<F, Sc>>,
    sources: HashMap<String, NodeId>,
}

impl<F: Fact, Sc: Score> Default for GraphBuilder<F, Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fact, Sc: Score> GraphBuilder<F, Sc> {
    /// Creates a builder whose constraints have an empty package.
    pub fn new() -> Self {
        Self::with_package("")
    }

    /// Creates a builder whose constraints live in `package`.
    pub fn with_package(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            nodes: Vec::new(),
            sources: HashMap::new(),
        }
    }

    /// Appends a raw node.
    pub fn push(&mut self, spec: NodeSpec<F, Sc>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(spec);
        id
    }

    /// Source node for every fact of `class`.
    pub fn for_each(&mut self, class: &str) -> NodeId {
        if let Some(id) = self.sources.get(class) {
            return *id;
        }
        let id = self.push(NodeSpec::Source {
            class: class.to_string(),
        });
        self.sources.insert(class.to_string(), id);
        id
    }

    pub fn filter<P>(&mut self, upstream: NodeId, predicate: P) -> NodeId
    where
        P: Fn(&TupleView<'_, F>) -> bool + Send + Sync + 'static,
    {
        self.push(NodeSpec::Filter {
            upstream,
            predicate: Arc::new(predicate),
        })
    }

    /// Equality join of `left` and `right` on the given keys.
    pub fn join<L, R, K>(&mut self, left: NodeId, right: NodeId, left_key: L, right_key: R) -> NodeId
    where
        L: Fn(&TupleView<'_, F>) -> K + Send + Sync + 'static,
        R: Fn(&TupleView<'_, F>) -> K + Send + Sync + 'static,
        K: Into<Value>,
    {
        self.push(NodeSpec::Join {
            left,
            right,
            left_key: Arc::new(move |t: &TupleView<'_, F>| -> Value { left_key(t).into() }),
            right_key: Arc::new(move |t: &TupleView<'_, F>| -> Value { right_key(t).into() }),
        })
    }

    pub fn group_by<G, K>(&mut self, upstream: NodeId, key: G, collector: Collector<F>) -> NodeId
    where
        G: Fn(&TupleView<'_, F>) -> K + Send + Sync + 'static,
        K: Into<Value>,
    {
        self.push(NodeSpec::Group {
            upstream,
            key: Arc::new(move |t: &TupleView<'_, F>| -> Value { key(t).into() }),
            collector,
        })
    }

    pub fn map<M, V>(&mut self, upstream: NodeId, mapper: M) -> NodeId
    where
        M: Fn(&TupleView<'_, F>) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.push(NodeSpec::Map {
            upstream,
            mapper: Arc::new(move |t: &TupleView<'_, F>| -> Value { mapper(t).into() }),
        })
    }

    pub fn flatten<X, I>(&mut self, upstream: NodeId, expand: X) -> NodeId
    where
        X: Fn(&TupleView<'_, F>) -> I + Send + Sync + 'static,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push(NodeSpec::Flatten {
            upstream,
            expand: Arc::new(move |t: &TupleView<'_, F>| -> Vec<Value> {
                expand(t).into_iter().map(Into::into).collect()
            }),
        })
    }

    /// Subtracts `weight` per match.
    pub fn penalize(&mut self, upstream: NodeId, name: &str, weight: Sc) -> NodeId {
        self.scorer(upstream, name, ImpactType::Penalty, weight, None)
    }

    /// Subtracts `weight × match_weight(tuple)` per match.
    pub fn penalize_by<W>(&mut self, upstream: NodeId, name: &str, weight: Sc, match_weight: W) -> NodeId
    where
        W: Fn(&TupleView<'_, F>) -> i64 + Send + Sync + 'static,
    {
        let match_weight: MatchWeightFn<F> = Arc::new(match_weight);
        self.scorer(upstream, name, ImpactType::Penalty, weight, Some(match_weight))
    }

    /// Adds `weight` per match.
    pub fn reward(&mut self, upstream: NodeId, name: &str, weight: Sc) -> NodeId {
        self.scorer(upstream, name, ImpactType::Reward, weight, None)
    }

    /// Adds `weight × match_weight(tuple)` per match.
    pub fn reward_by<W>(&mut self, upstream: NodeId, name: &str, weight: Sc, match_weight: W) -> NodeId
    where
        W: Fn(&TupleView<'_, F>) -> i64 + Send + Sync + 'static,
    {
        let match_weight: MatchWeightFn<F> = Arc::new(match_weight);
        self.scorer(upstream, name, ImpactType::Reward, weight, Some(match_weight))
    }

    fn scorer(
        &mut self,
        upstream: NodeId,
        name: &str,
        impact: ImpactType,
        weight: Sc,
        match_weight: Option<MatchWeightFn<F>>,
    ) -> NodeId {
        self.push(NodeSpec::Scorer {
            upstream,
            constraint: ConstraintRef::new(self.package.clone(), name),
            impact,
            weight,
            match_weight,
        })
    }

    /// Number of nodes declared so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compiles the declared nodes.
    pub fn build(self) -> Result<Arc<ConstraintGraph<F, Sc>>, GraphError> {
        ConstraintGraph::new(self.nodes).map(Arc::new)
    }
}
