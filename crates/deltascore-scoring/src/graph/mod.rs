//! Compiled constraint graphs.
//!
//! [`ConstraintGraph::new`] validates a node list and fixes everything a
//! session needs to run it: the consumers of every node, the scratch slot
//! each consumer claims on its producer's tuples, the source nodes per fact
//! class and the scoring nodes. A compiled graph is immutable and shared
//! between sessions through `Arc`.

mod builder;

#[cfg(test)]
mod tests;

pub use builder::GraphBuilder;

use std::collections::HashMap;
use std::fmt;

use deltascore_core::{ConstraintRef, DeltaScoreError};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::node::{NodeId, NodeKind, NodeSpec};

/// Error compiling a node list into a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("{node} references {upstream}, which does not exist")]
    UnknownNode { node: NodeId, upstream: NodeId },

    #[error("{node} references {upstream}, which is not declared before it")]
    ForwardReference { node: NodeId, upstream: NodeId },

    #[error("{node} consumes scoring node {upstream}; scoring nodes are terminal")]
    ScorerUpstream { node: NodeId, upstream: NodeId },

    #[error("constraint '{0}' is scored by more than one node")]
    DuplicateConstraint(ConstraintRef),
}

impl From<GraphError> for DeltaScoreError {
    fn from(err: GraphError) -> Self {
        DeltaScoreError::Graph(err.to_string())
    }
}

/// One edge of the graph seen from the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consumer {
    /// The consuming node.
    pub node: NodeId,
    /// Which input of the consumer this edge feeds: 0, or 1 for the right
    /// side of a join.
    pub input: usize,
    /// Scratch slot the consumer owns on the producer's tuples.
    pub slot: usize,
}

/// A validated, immutable propagation graph.
pub struct ConstraintGraph<F, Sc> {
    nodes: Vec<NodeSpec<F, Sc>>,
    consumers: Vec<Vec<Consumer>>,
    input_slots: Vec<SmallVec<[usize; 2]>>,
    sources: HashMap<String, Vec<NodeId>>,
    scorers: Vec<NodeId>,
}

impl<F, Sc> ConstraintGraph<F, Sc> {
    /// Validates and compiles `nodes`; node `i` gets id `NodeId::new(i)`.
    ///
    /// Upstream references must point to earlier nodes, scoring nodes may
    /// not feed other nodes and every constraint may be scored only once.
    /// An empty node list compiles to a graph that always scores zero.
    pub fn new(nodes: Vec<NodeSpec<F, Sc>>) -> Result<Self, GraphError> {
        let mut consumers: Vec<Vec<Consumer>> = Vec::with_capacity(nodes.len());
        let mut input_slots = Vec::with_capacity(nodes.len());
        let mut sources: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut scorers = Vec::new();
        let mut constraints: HashMap<&ConstraintRef, NodeId> = HashMap::new();

        for (index, spec) in nodes.iter().enumerate() {
            let node = NodeId::new(index);
            let mut slots = SmallVec::new();
            for (input, upstream) in spec.upstreams().into_iter().enumerate() {
                if upstream.index() >= nodes.len() {
                    return Err(GraphError::UnknownNode { node, upstream });
                }
                if upstream >= node {
                    return Err(GraphError::ForwardReference { node, upstream });
                }
                if nodes[upstream.index()].kind() == NodeKind::Scorer {
                    return Err(GraphError::ScorerUpstream { node, upstream });
                }
                let edges = &mut consumers[upstream.index()];
                let slot = edges.len();
                edges.push(Consumer { node, input, slot });
                slots.push(slot);
            }
            consumers.push(Vec::new());
            input_slots.push(slots);

            match spec {
                NodeSpec::Source { class } => sources.entry(class.clone()).or_default().push(node),
                NodeSpec::Scorer { constraint, .. } => {
                    if constraints.insert(constraint, node).is_some() {
                        return Err(GraphError::DuplicateConstraint(constraint.clone()));
                    }
                    scorers.push(node);
                }
                _ => {}
            }
        }

        debug!(
            event = "graph_compiled",
            node_count = nodes.len(),
            source_classes = sources.len(),
            constraint_count = scorers.len(),
        );

        Ok(Self {
            nodes,
            consumers,
            input_slots,
            sources,
            scorers,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    /// Panics if `id` is not a node of this graph.
    pub fn node(&self, id: NodeId) -> &NodeSpec<F, Sc> {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    /// Iterates nodes in id (topological) order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeSpec<F, Sc>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, spec)| (NodeId::new(index), spec))
    }

    /// Consumers of `id`'s output, in slot order.
    pub fn consumers(&self, id: NodeId) -> &[Consumer] {
        &self.consumers[id.index()]
    }

    /// Number of scratch slots on every tuple `id` produces.
    pub fn store_size(&self, id: NodeId) -> usize {
        self.consumers[id.index()].len()
    }

    /// Scratch slot `id` claimed on each of its upstreams, in input order.
    pub fn input_slots(&self, id: NodeId) -> &[usize] {
        &self.input_slots[id.index()]
    }

    /// Source nodes fed by facts of `class`.
    pub fn sources_for(&self, class: &str) -> &[NodeId] {
        self.sources.get(class).map_or(&[], Vec::as_slice)
    }

    /// Scoring nodes in declaration order.
    pub fn scorers(&self) -> &[NodeId] {
        &self.scorers
    }

    pub fn constraint_count(&self) -> usize {
        self.scorers.len()
    }

    /// Finds the scoring node of `constraint`.
    pub fn find_constraint(&self, constraint: &ConstraintRef) -> Option<NodeId> {
        self.scorers
            .iter()
            .copied()
            .find(|id| self.node(*id).constraint() == Some(constraint))
    }

    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> + '_ {
        self.scorers.iter().filter_map(|id| self.node(*id).constraint())
    }
}

impl<F, Sc: fmt::Debug> fmt::Debug for ConstraintGraph<F, Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintGraph")
            .field("nodes", &self.nodes)
            .field("constraints", &self.scorers.len())
            .finish()
    }
}
