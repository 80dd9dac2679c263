// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: graph document → shapes → model structure.
//!
//! These exercise the library crates together without the editor session:
//! connection checks, explicit flatten insertion, propagation and
//! linearization must agree with one another.

use layer_spec::{Conv2dConfig, DenseConfig, LayerConfig, LayerKind, Padding, Window};
use model_builder::{extract_model_structure, prepare_for_generation, BuildError};
use model_graph::{Draft, GraphDocument, ModelGraph, NodeId, SequenceId};
use shape_inference::{
    calculate_graph_shapes, validate_connection, ConnectionError, Remediation, ReshapePolicy,
};
use tensor_shape::Shape;

// ── Helpers ────────────────────────────────────────────────────

/// mnist(0) → conv2d(1) → dense(2), with the conv edge into dense
/// deliberately left unconnected.
fn mnist_conv_dense() -> (ModelGraph<Draft>, NodeId, NodeId, NodeId) {
    let mut graph = ModelGraph::new("mnist-cnn");
    let data: NodeId = "mnist".into();
    let conv: NodeId = "conv".into();
    let dense: NodeId = "dense".into();
    graph
        .add_node_with(data.clone(), LayerKind::DataMnist, SequenceId::new(0.0), None)
        .unwrap();
    graph
        .add_node_with(
            conv.clone(),
            LayerKind::Conv2d,
            SequenceId::new(1.0),
            Some(LayerConfig::Conv2d(Conv2dConfig {
                kernel_size: Window::square(5),
                filters: 8,
                strides: Window::square(1),
                padding: Padding::Valid,
                ..Conv2dConfig::default()
            })),
        )
        .unwrap();
    graph
        .add_node_with(
            dense.clone(),
            LayerKind::Dense,
            SequenceId::new(2.0),
            Some(LayerConfig::Dense(DenseConfig {
                units: 10,
                ..DenseConfig::default()
            })),
        )
        .unwrap();
    graph.connect(&data, &conv).unwrap();
    (graph, data, conv, dense)
}

// ── Tests ──────────────────────────────────────────────────────

#[test]
fn test_mnist_conv_dense_scenario() {
    let (mut graph, _data, conv, dense) = mnist_conv_dense();

    // The user draws conv → dense: rejected with a flatten suggestion.
    let shapes = calculate_graph_shapes(&graph, ReshapePolicy::Permissive);
    let conv_out = shapes.output(&conv).cloned().unwrap();
    assert_eq!(conv_out, Shape::batched(&[24, 24, 8]));

    let conv_node = graph.node(&conv).unwrap().clone();
    let dense_node = graph.node(&dense).unwrap().clone();
    let err = validate_connection(
        &graph.config_for(&conv_node),
        &graph.config_for(&dense_node),
        Some(&conv_out),
        ReshapePolicy::Permissive,
    )
    .unwrap_err();
    assert!(matches!(err, ConnectionError::NeedsFlatten { .. }));
    assert_eq!(err.remediation(), Some(Remediation::InsertFlatten));

    // The fix: flatten at sequence 1.5 between the two.
    let flatten: NodeId = "flatten".into();
    graph
        .add_node_with(flatten.clone(), LayerKind::Flatten, SequenceId::new(1.5), None)
        .unwrap();
    graph.connect(&conv, &flatten).unwrap();
    graph.connect(&flatten, &dense).unwrap();

    let shapes = calculate_graph_shapes(&graph, ReshapePolicy::Permissive);
    assert!(shapes.is_clean(), "unexpected errors: {:?}", shapes.errors());
    assert_eq!(shapes.output(&flatten), Some(&Shape::batched(&[4608])));
    assert_eq!(shapes.output(&dense), Some(&Shape::batched(&[10])));

    let structure = extract_model_structure(
        &graph.name,
        graph.nodes(),
        graph.edges(),
        graph.configs(),
    );
    assert_eq!(
        structure.kinds(),
        vec![LayerKind::Conv2d, LayerKind::Flatten, LayerKind::Dense]
    );

    let generated = prepare_for_generation(&graph, ReshapePolicy::Permissive).unwrap();
    assert_eq!(generated.kinds(), structure.kinds());
    assert!(generated.iter().all(|l| !l.implicit));
}

#[test]
fn test_linearization_ignores_edge_insertion_order() {
    let json = |edges: &str| {
        format!(
            r#"{{
            "name": "order",
            "nodes": [
                {{ "id": "d", "type": "dense", "sequenceId": 4 }},
                {{ "id": "p", "type": "max-pool2d", "sequenceId": 2 }},
                {{ "id": "m", "type": "data-mnist", "sequenceId": 0 }},
                {{ "id": "f", "type": "flatten", "sequenceId": 3 }},
                {{ "id": "c", "type": "conv2d", "sequenceId": 1 }}
            ],
            "edges": [{edges}]
        }}"#
        )
    };
    let forward = json(
        r#"{ "source": "m", "target": "c" }, { "source": "c", "target": "p" },
           { "source": "p", "target": "f" }, { "source": "f", "target": "d" }"#,
    );
    let backward = json(
        r#"{ "source": "f", "target": "d" }, { "source": "p", "target": "f" },
           { "source": "c", "target": "p" }, { "source": "m", "target": "c" }"#,
    );

    let a = GraphDocument::from_json(&forward).unwrap().into_graph().unwrap();
    let b = GraphDocument::from_json(&backward).unwrap().into_graph().unwrap();
    let sa = prepare_for_generation(&a, ReshapePolicy::Permissive).unwrap();
    let sb = prepare_for_generation(&b, ReshapePolicy::Permissive).unwrap();
    assert_eq!(sa, sb);
    assert_eq!(
        sa.kinds(),
        vec![
            LayerKind::Conv2d,
            LayerKind::MaxPool2d,
            LayerKind::Flatten,
            LayerKind::Dense
        ]
    );
}

#[test]
fn test_generation_blocked_without_data_source() {
    let json = r#"{ "nodes": [ { "id": "d", "type": "dense" } ] }"#;
    let graph = GraphDocument::from_json(json).unwrap().into_graph().unwrap();
    let err = prepare_for_generation(&graph, ReshapePolicy::Permissive).unwrap_err();
    assert!(matches!(err, BuildError::Structure(_)));

    let shapes = calculate_graph_shapes(&graph, ReshapePolicy::Permissive);
    assert!(!shapes.issues().is_empty());
}

#[test]
fn test_generated_structure_serializes() {
    let (mut graph, _, conv, dense) = mnist_conv_dense();
    graph.connect(&conv, &dense).unwrap();
    let structure = prepare_for_generation(&graph, ReshapePolicy::Permissive).unwrap();
    let value: serde_json::Value = serde_json::from_str(&structure.to_json().unwrap()).unwrap();
    let layers = value["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0]["type"], "conv2d");
    assert_eq!(layers[0]["config"]["filters"], 8);
    assert_eq!(layers[1]["type"], "flatten");
    assert_eq!(layers[1]["implicit"], true);
    assert_eq!(layers[2]["config"]["units"], 10);
}
