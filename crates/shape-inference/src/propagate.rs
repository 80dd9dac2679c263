// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-graph shape propagation.
//!
//! Stateless: every call recomputes the full map from the nodes, edges and
//! configs it is given. Inputs are never mutated.

use crate::{validate_connection, ConnectionError, GraphIssue, NodeShape, ReshapePolicy, ShapeMap};
use layer_spec::compute_output_shape;
use model_graph::{topology, ConfigLookup, Edge, GraphState, LayerNode, ModelGraph, NodeId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Propagates shapes from every data source through the graph.
///
/// # Algorithm
/// 1. Every data-source node seeds the traversal with its fixed output
///    shape. No sources is reported as [`GraphIssue::NoDataSource`].
/// 2. Breadth first from the seeds, following outgoing edges in edge-list
///    order; each node is visited once.
/// 3. A visited node takes its input from the source of its **first**
///    incoming edge in edge-list order. If that source has no recorded
///    output the node fails with
///    [`ConnectionError::UnresolvedSourceShape`]; otherwise the edge is
///    checked with [`validate_connection`].
/// 4. Failures are recorded and traversal continues, so downstream nodes
///    report the unresolved input instead of disappearing.
///
/// Edges with a missing endpoint are skipped with a warning. A cycle is
/// reported as [`GraphIssue::CyclicGraph`]; the map still holds whatever
/// the traversal reached.
pub fn calculate_model_shapes<C>(
    nodes: &[LayerNode],
    edges: &[Edge],
    configs: &C,
    policy: ReshapePolicy,
) -> ShapeMap
where
    C: ConfigLookup + ?Sized,
{
    let mut map = ShapeMap::new();

    let known = topology::node_ids(nodes);
    let attached: Vec<Edge> = edges
        .iter()
        .filter(|edge| {
            let keep = topology::is_attached(edge, &known);
            if !keep {
                tracing::warn!(
                    "skipping edge '{}': endpoint missing ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
            }
            keep
        })
        .cloned()
        .collect();

    if let Some(cycle) = topology::find_cycle(nodes, &attached) {
        tracing::warn!("cycle detected through {} nodes", cycle.len());
        map.add_issue(GraphIssue::CyclicGraph(cycle));
    }

    let by_id: HashMap<&NodeId, &LayerNode> = nodes.iter().map(|n| (&n.id, n)).collect();
    let seeds: Vec<&LayerNode> = nodes.iter().filter(|n| n.kind.is_source()).collect();
    if seeds.is_empty() {
        tracing::warn!("no data source, nothing to propagate");
        map.add_issue(GraphIssue::NoDataSource);
        return map;
    }

    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut queue: VecDeque<&NodeId> = VecDeque::new();
    for seed in &seeds {
        if !visited.insert(&seed.id) {
            continue;
        }
        let config = configs.resolve(seed);
        let entry = match compute_output_shape(&config, None) {
            Some(output) => NodeShape::Resolved {
                input: None,
                output,
            },
            None => NodeShape::Failed {
                error: ConnectionError::UnresolvedSourceShape {
                    source_kind: seed.kind,
                },
                input: None,
            },
        };
        tracing::debug!("seed '{}' ({}): {:?}", seed.id, seed.kind, entry.output());
        map.record(seed.id.clone(), entry);
        queue.push_back(&seed.id);
    }

    while let Some(current) = queue.pop_front() {
        for edge in attached.iter().filter(|e| &e.source == current) {
            let Some(target) = by_id.get(&edge.target).copied() else {
                continue;
            };
            if !visited.insert(&target.id) {
                continue;
            }
            let entry = resolve_node(target, edge, &attached, &by_id, &map, configs, policy);
            tracing::debug!("node '{}' ({}): {:?}", target.id, target.kind, entry);
            map.record(target.id.clone(), entry);
            queue.push_back(&target.id);
        }
    }

    tracing::debug!(
        "propagated {} of {} nodes, {} errors",
        map.len(),
        nodes.len(),
        map.errors().len()
    );
    map
}

/// Propagates shapes through a [`ModelGraph`] in any state.
pub fn calculate_graph_shapes<S: GraphState>(
    graph: &ModelGraph<S>,
    policy: ReshapePolicy,
) -> ShapeMap {
    calculate_model_shapes(graph.nodes(), graph.edges(), graph.configs(), policy)
}

fn resolve_node<C>(
    target: &LayerNode,
    via: &Edge,
    edges: &[Edge],
    by_id: &HashMap<&NodeId, &LayerNode>,
    map: &ShapeMap,
    configs: &C,
    policy: ReshapePolicy,
) -> NodeShape
where
    C: ConfigLookup + ?Sized,
{
    let incoming = topology::incoming(edges, &target.id).count();
    if incoming > 1 {
        tracing::warn!(
            "node '{}' has {} incoming edges, using the first",
            target.id,
            incoming
        );
    }

    let first = topology::first_incoming(edges, &target.id).unwrap_or(via);
    let Some(source) = by_id.get(&first.source).copied() else {
        return NodeShape::Failed {
            error: ConnectionError::UnresolvedSourceShape {
                source_kind: target.kind,
            },
            input: None,
        };
    };

    let Some(upstream) = map.output(&source.id) else {
        return NodeShape::Failed {
            error: ConnectionError::UnresolvedSourceShape {
                source_kind: source.kind,
            },
            input: None,
        };
    };

    let source_config = configs.resolve(source);
    let target_config = configs.resolve(target);
    match validate_connection(&source_config, &target_config, Some(upstream), policy) {
        Ok(connection) => NodeShape::Resolved {
            input: Some(connection.source_output),
            output: connection.target_output,
        },
        Err(error) => NodeShape::Failed {
            error,
            input: Some(upstream.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_spec::{LayerConfig, LayerKind, RecurrentConfig};
    use model_graph::{ConfigStore, GraphDocument};
    use tensor_shape::Shape;

    fn graph(json: &str) -> ModelGraph {
        GraphDocument::from_json(json).unwrap().into_graph().unwrap()
    }

    fn shapes(json: &str) -> (ModelGraph, ShapeMap) {
        let g = graph(json);
        let map = calculate_graph_shapes(&g, ReshapePolicy::Permissive);
        (g, map)
    }

    const CNN: &str = r#"{
        "nodes": [
            { "id": "data", "type": "data-mnist", "sequenceId": 0 },
            { "id": "conv", "type": "conv2d", "sequenceId": 1,
              "config": { "kernelSize": 5, "filters": 16 } },
            { "id": "flat", "type": "flatten", "sequenceId": 2 },
            { "id": "out", "type": "dense", "sequenceId": 3 }
        ],
        "edges": [
            { "source": "data", "target": "conv" },
            { "source": "conv", "target": "flat" },
            { "source": "flat", "target": "out" }
        ]
    }"#;

    #[test]
    fn test_clean_cnn() {
        let (_, map) = shapes(CNN);
        assert!(map.is_clean());
        assert_eq!(map.len(), 4);
        assert_eq!(map.output(&"conv".into()), Some(&Shape::batched(&[24, 24, 16])));
        assert_eq!(map.output(&"flat".into()), Some(&Shape::batched(&[9216])));
        assert_eq!(map.output(&"out".into()), Some(&Shape::batched(&[10])));
        assert_eq!(
            map.get(&"out".into()).unwrap().input(),
            Some(&Shape::batched(&[9216]))
        );
        let order: Vec<&str> = map.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["data", "conv", "flat", "out"]);
    }

    #[test]
    fn test_deterministic() {
        let g = graph(CNN);
        let a = calculate_graph_shapes(&g, ReshapePolicy::Permissive);
        let b = calculate_graph_shapes(&g, ReshapePolicy::Permissive);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_data_source() {
        let (_, map) = shapes(
            r#"{ "nodes": [ { "id": "d", "type": "dense" } ], "edges": [] }"#,
        );
        assert_eq!(map.issues(), &[GraphIssue::NoDataSource]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_error_does_not_abort_and_propagates_unresolved() {
        let (_, map) = shapes(
            r#"{
            "nodes": [
                { "id": "data", "type": "data-mnist" },
                { "id": "conv", "type": "conv2d" },
                { "id": "dense", "type": "dense" },
                { "id": "drop", "type": "dropout" }
            ],
            "edges": [
                { "source": "data", "target": "conv" },
                { "source": "conv", "target": "dense" },
                { "source": "dense", "target": "drop" }
            ]
        }"#,
        );
        assert!(map.get(&"conv".into()).unwrap().is_resolved());
        let dense = map.get(&"dense".into()).unwrap();
        assert!(matches!(dense.error(), Some(ConnectionError::NeedsFlatten { .. })));
        assert_eq!(dense.input(), Some(&Shape::batched(&[24, 24, 8])));
        assert!(matches!(
            map.get(&"drop".into()).unwrap().error(),
            Some(ConnectionError::UnresolvedSourceShape {
                source_kind: LayerKind::Dense
            })
        ));
        assert_eq!(map.errors().len(), 2);
    }

    #[test]
    fn test_unreached_nodes_have_no_entry() {
        let (_, map) = shapes(
            r#"{
            "nodes": [
                { "id": "data", "type": "data-mnist" },
                { "id": "flat", "type": "flatten" },
                { "id": "lonely", "type": "dense" }
            ],
            "edges": [ { "source": "data", "target": "flat" } ]
        }"#,
        );
        assert!(map.contains(&"flat".into()));
        assert!(!map.contains(&"lonely".into()));
    }

    #[test]
    fn test_dangling_edges_are_skipped() {
        let (_, map) = shapes(
            r#"{
            "nodes": [
                { "id": "data", "type": "data-mnist" },
                { "id": "flat", "type": "flatten" }
            ],
            "edges": [
                { "source": "ghost", "target": "flat" },
                { "source": "data", "target": "flat" }
            ]
        }"#,
        );
        assert!(map.is_clean());
        assert_eq!(map.output(&"flat".into()), Some(&Shape::batched(&[784])));
    }

    #[test]
    fn test_first_incoming_edge_wins() {
        let (_, map) = shapes(
            r#"{
            "nodes": [
                { "id": "data", "type": "data-mnist" },
                { "id": "pool", "type": "max-pool2d" },
                { "id": "flat", "type": "flatten" }
            ],
            "edges": [
                { "source": "data", "target": "pool" },
                { "source": "pool", "target": "flat" },
                { "source": "data", "target": "flat" }
            ]
        }"#,
        );
        // BFS reaches flatten from data first, but pool -> flat is the
        // first incoming edge, and pool is already resolved by then.
        assert_eq!(map.output(&"flat".into()), Some(&Shape::batched(&[196])));
    }

    #[test]
    fn test_cycle_is_reported() {
        let (_, map) = shapes(
            r#"{
            "nodes": [
                { "id": "data", "type": "data-mnist" },
                { "id": "flat", "type": "flatten" },
                { "id": "a", "type": "dropout" },
                { "id": "b", "type": "dropout" }
            ],
            "edges": [
                { "source": "data", "target": "flat" },
                { "source": "flat", "target": "a" },
                { "source": "a", "target": "b" },
                { "source": "b", "target": "a" }
            ]
        }"#,
        );
        assert!(matches!(map.issues(), [GraphIssue::CyclicGraph(ids)] if ids.len() == 2));
        assert!(map.output(&"b".into()).is_some());
    }

    #[test]
    fn test_csv_into_lstm_toggle() {
        let mut g = graph(
            r#"{
            "nodes": [
                { "id": "csv", "type": "data-csv",
                  "config": { "timeSteps": 10, "features": 8 } },
                { "id": "rnn", "type": "lstm", "config": { "units": 64 } }
            ],
            "edges": [ { "source": "csv", "target": "rnn" } ]
        }"#,
        );
        let map = calculate_graph_shapes(&g, ReshapePolicy::Permissive);
        assert_eq!(map.output(&"rnn".into()), Some(&Shape::batched(&[64])));

        g.set_config(
            &"rnn".into(),
            LayerConfig::Lstm(RecurrentConfig {
                units: 64,
                return_sequences: true,
                ..RecurrentConfig::default()
            }),
        )
        .unwrap();
        let map = calculate_graph_shapes(&g, ReshapePolicy::Permissive);
        assert_eq!(map.output(&"rnn".into()), Some(&Shape::batched(&[10, 64])));
    }

    #[test]
    fn test_missing_configs_use_defaults() {
        let nodes = vec![
            LayerNode::new("data", LayerKind::DataMnist, 0.0),
            LayerNode::new("pool", LayerKind::AvgPool2d, 1.0),
        ];
        let edges = vec![Edge::new("e", "data", "pool")];
        let map = calculate_model_shapes(&nodes, &edges, &ConfigStore::new(), ReshapePolicy::Strict);
        assert_eq!(map.output(&"pool".into()), Some(&Shape::batched(&[14, 14, 1])));
    }
}
