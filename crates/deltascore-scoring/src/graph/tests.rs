use std::sync::Arc;

use deltascore_core::{ConstraintRef, DeltaScoreError, ImpactType, SimpleScore};

use super::*;
use crate::collector;
use crate::fact::Fact;
use crate::node::NodeSpec;
use crate::tuple::TupleView;
use crate::value::Value;

struct Item {
    group: i64,
}

impl Fact for Item {
    fn class_name(&self) -> &'static str {
        "Item"
    }
}

fn scorer(upstream: usize, name: &str) -> NodeSpec<Item, SimpleScore> {
    NodeSpec::Scorer {
        upstream: NodeId::new(upstream),
        constraint: ConstraintRef::new("", name),
        impact: ImpactType::Penalty,
        weight: SimpleScore::of(1),
        match_weight: None,
    }
}

fn source() -> NodeSpec<Item, SimpleScore> {
    NodeSpec::Source {
        class: "Item".to_string(),
    }
}

mod compile {
    use super::*;

    #[test]
    fn test_empty_graph_is_valid() {
        let graph = ConstraintGraph::<Item, SimpleScore>::new(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.scorers().is_empty());
        assert!(graph.sources_for("Item").is_empty());
    }

    #[test]
    fn test_slots_follow_consumer_order() {
        let graph = ConstraintGraph::new(vec![
            source(),
            NodeSpec::Join {
                left: NodeId::new(0),
                right: NodeId::new(0),
                left_key: Arc::new(|t: &TupleView<'_, Item>| Value::Int(t.fact(0).group)),
                right_key: Arc::new(|t: &TupleView<'_, Item>| Value::Int(t.fact(0).group)),
            },
            scorer(0, "Every item"),
            scorer(1, "Same group"),
        ])
        .unwrap();

        let consumers = graph.consumers(NodeId::new(0));
        assert_eq!(consumers.len(), 3);
        assert_eq!(
            consumers[0],
            Consumer {
                node: NodeId::new(1),
                input: 0,
                slot: 0
            }
        );
        assert_eq!(
            consumers[1],
            Consumer {
                node: NodeId::new(1),
                input: 1,
                slot: 1
            }
        );
        assert_eq!(consumers[2].node, NodeId::new(2));
        assert_eq!(graph.store_size(NodeId::new(0)), 3);
        assert_eq!(graph.input_slots(NodeId::new(1)), &[0, 1]);
        assert_eq!(graph.input_slots(NodeId::new(2)), &[2]);
        assert_eq!(graph.store_size(NodeId::new(3)), 0);
    }

    #[test]
    fn test_sources_and_scorers_indexed() {
        let graph = ConstraintGraph::new(vec![
            source(),
            NodeSpec::Source {
                class: "Other".to_string(),
            },
            scorer(0, "A"),
            scorer(1, "B"),
        ])
        .unwrap();

        assert_eq!(graph.sources_for("Item"), &[NodeId::new(0)]);
        assert_eq!(graph.sources_for("Other"), &[NodeId::new(1)]);
        assert!(graph.sources_for("Missing").is_empty());
        assert_eq!(graph.scorers(), &[NodeId::new(2), NodeId::new(3)]);
        assert_eq!(
            graph.find_constraint(&ConstraintRef::new("", "B")),
            Some(NodeId::new(3))
        );
        assert_eq!(graph.find_constraint(&ConstraintRef::new("x", "B")), None);
    }

    #[test]
    fn test_group_node_debug_names_collector() {
        let group: NodeSpec<Item, SimpleScore> = NodeSpec::Group {
            upstream: NodeId::new(0),
            key: Arc::new(|t: &TupleView<'_, Item>| Value::Int(t.fact(0).group)),
            collector: collector::count(),
        };
        let rendered = format!("{:?}", group);
        assert!(rendered.starts_with("Group"), "{}", rendered);
        assert!(rendered.contains("\"count\""), "{}", rendered);
    }
}

mod validation {
    use super::*;

    #[test]
    fn test_unknown_upstream() {
        let err = ConstraintGraph::new(vec![source(), scorer(7, "A")]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownNode {
                node: NodeId::new(1),
                upstream: NodeId::new(7)
            }
        );
    }

    #[test]
    fn test_forward_reference() {
        let err = ConstraintGraph::new(vec![
            NodeSpec::Filter {
                upstream: NodeId::new(1),
                predicate: Arc::new(|_: &TupleView<'_, Item>| true),
            },
            source(),
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::ForwardReference { .. }));
    }

    #[test]
    fn test_scorer_cannot_feed_nodes() {
        let err = ConstraintGraph::new(vec![
            source(),
            scorer(0, "A"),
            NodeSpec::Map {
                upstream: NodeId::new(1),
                mapper: Arc::new(|_: &TupleView<'_, Item>| Value::None),
            },
        ])
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::ScorerUpstream {
                node: NodeId::new(2),
                upstream: NodeId::new(1)
            }
        );
    }

    #[test]
    fn test_duplicate_constraint() {
        let err = ConstraintGraph::new(vec![source(), scorer(0, "A"), scorer(0, "A")]).unwrap_err();
        assert_eq!(err, GraphError::DuplicateConstraint(ConstraintRef::new("", "A")));

        let converted: DeltaScoreError = err.into();
        assert!(converted.to_string().contains("'A'"));
    }
}

mod builder {
    use super::*;

    #[test]
    fn test_for_each_shares_sources() {
        let mut builder = GraphBuilder::<Item, SimpleScore>::new();
        let a = builder.for_each("Item");
        let b = builder.for_each("Item");
        assert_eq!(a, b);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_builder_assigns_package() {
        let mut builder = GraphBuilder::<Item, SimpleScore>::with_package("inventory");
        let items = builder.for_each("Item");
        let big = builder.filter(items, |t| t.fact(0).group > 2);
        let groups = builder.group_by(big, |t| t.fact(0).group, collector::count());
        builder.reward(groups, "Big groups", SimpleScore::of(2));

        let graph = builder.build().unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.kind(NodeId::new(2)), NodeKind::Group);
        let names: Vec<String> = graph.constraint_refs().map(ConstraintRef::full_name).collect();
        assert_eq!(names, vec!["inventory/Big groups"]);
    }

    #[test]
    fn test_build_reports_errors() {
        let mut builder = GraphBuilder::<Item, SimpleScore>::new();
        let items = builder.for_each("Item");
        builder.penalize(items, "Twice", SimpleScore::of(1));
        builder.penalize(items, "Twice", SimpleScore::of(2));
        assert!(matches!(
            builder.build(),
            Err(GraphError::DuplicateConstraint(_))
        ));
    }

    #[test]
    fn test_graph_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConstraintGraph<Item, SimpleScore>>();
    }
}
