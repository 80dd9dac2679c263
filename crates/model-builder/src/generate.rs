// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The gate in front of code generation.

use crate::{extract_model_structure, BuildError, ModelStructure};
use layer_spec::LayerKind;
use model_graph::{topology, EdgeId, GraphState, ModelGraph, NodeId};
use shape_inference::{calculate_graph_shapes, ConnectionError, Remediation, ReshapePolicy};
use std::collections::HashSet;

/// Produces the model structure for code generation, or the reason it
/// cannot be generated. All or nothing.
///
/// # Steps
/// 1. Structural validation (see `ModelGraph::check_structure`).
/// 2. Shape propagation. Edges failing with `NeedsFlatten` get a flatten
///    layer inserted on a working copy, then shapes are propagated again.
///    Any remaining error blocks generation, naming every failing node.
/// 3. Extraction and the implicit-flatten pass.
///
/// The input graph is never modified.
pub fn prepare_for_generation<S: GraphState>(
    graph: &ModelGraph<S>,
    policy: ReshapePolicy,
) -> Result<ModelStructure, BuildError> {
    graph.check_structure()?;

    let mut working = graph.clone().into_draft();
    let mut shapes = calculate_graph_shapes(&working, policy);

    let fixable: Vec<EdgeId> = shapes
        .errors()
        .into_iter()
        .filter(|(_, err)| err.remediation() == Some(Remediation::InsertFlatten))
        .filter_map(|(id, _)| topology::first_incoming(working.edges(), id).map(|e| e.id.clone()))
        .collect();
    let mut inserted: HashSet<NodeId> = HashSet::new();
    for edge in &fixable {
        let id = working.insert_between(edge, LayerKind::Flatten, None)?;
        tracing::info!("inserted flatten '{}' to resolve a rank mismatch", id);
        inserted.insert(id);
    }
    if !inserted.is_empty() {
        shapes = calculate_graph_shapes(&working, policy);
    }

    if let Some(issue) = shapes.issues().first() {
        return Err(issue.clone().into());
    }
    let failures: Vec<(NodeId, ConnectionError)> = shapes
        .errors()
        .into_iter()
        .map(|(id, err)| (id.clone(), err.clone()))
        .collect();
    if !failures.is_empty() {
        return Err(BuildError::ShapeErrors(failures));
    }

    let mut structure = extract_model_structure(
        &working.name,
        working.nodes(),
        working.edges(),
        working.configs(),
    );
    for layer in &mut structure.layers {
        if layer.node_id.as_ref().is_some_and(|id| inserted.contains(id)) {
            layer.node_id = None;
            layer.implicit = true;
        }
    }
    let structure = structure.with_implicit_flattens();
    if structure.is_empty() {
        return Err(BuildError::EmptyStructure);
    }

    tracing::info!("prepared model for generation: {}", structure);
    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_spec::{LayerConfig, ReshapeConfig, TargetShape};
    use model_graph::{Draft, GraphError};

    fn chain(kinds: &[LayerKind]) -> (ModelGraph<Draft>, Vec<NodeId>) {
        let mut g = ModelGraph::new("m");
        let mut ids = Vec::new();
        for &kind in kinds {
            let id = g.add_node(kind, None).unwrap();
            if let Some(prev) = ids.last() {
                g.connect(prev, &id).unwrap();
            }
            ids.push(id);
        }
        (g, ids)
    }

    #[test]
    fn test_clean_graph() {
        let (g, _) = chain(&[
            LayerKind::DataMnist,
            LayerKind::Conv2d,
            LayerKind::MaxPool2d,
            LayerKind::Flatten,
            LayerKind::Dense,
        ]);
        let s = prepare_for_generation(&g, ReshapePolicy::Permissive).unwrap();
        assert_eq!(
            s.kinds(),
            vec![
                LayerKind::Conv2d,
                LayerKind::MaxPool2d,
                LayerKind::Flatten,
                LayerKind::Dense
            ]
        );
        assert!(s.iter().all(|l| !l.implicit));
    }

    #[test]
    fn test_structure_errors_block() {
        let (g, _) = chain(&[LayerKind::DataMnist, LayerKind::Conv2d]);
        assert!(matches!(
            prepare_for_generation(&g, ReshapePolicy::Permissive),
            Err(BuildError::Structure(GraphError::OutputNotDense { .. }))
        ));
    }

    #[test]
    fn test_conv_to_dense_gets_flatten() {
        let (g, _) = chain(&[LayerKind::DataMnist, LayerKind::Conv2d, LayerKind::Dense]);
        let s = prepare_for_generation(&g, ReshapePolicy::Permissive).unwrap();
        assert_eq!(
            s.kinds(),
            vec![LayerKind::Conv2d, LayerKind::Flatten, LayerKind::Dense]
        );
        assert!(s.layers[1].implicit);
        assert_eq!(s.layers[1].sequence_id.value(), 1.5);
        // The caller's graph is untouched.
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn test_shape_errors_block_and_name_nodes() {
        let (mut g, ids) = chain(&[
            LayerKind::DataMnist,
            LayerKind::Flatten,
            LayerKind::Reshape,
            LayerKind::Flatten,
            LayerKind::Dense,
        ]);
        g.set_config(
            &ids[2],
            LayerConfig::Reshape(ReshapeConfig {
                target_shape: TargetShape::new(vec![Some(50), Some(50)]),
                ..ReshapeConfig::default()
            }),
        )
        .unwrap();
        let err = prepare_for_generation(&g, ReshapePolicy::Permissive).unwrap_err();
        match &err {
            BuildError::ShapeErrors(failures) => {
                assert_eq!(failures[0].0, ids[2]);
                assert!(matches!(failures[0].1, ConnectionError::ReshapeMismatch { .. }));
                // Downstream nodes fail as unresolved.
                assert_eq!(failures.len(), 3);
            }
            other => panic!("expected ShapeErrors, got {other:?}"),
        }
        assert!(err.to_string().contains(ids[2].as_str()));
    }

    #[test]
    fn test_lstm_sequence_into_dense_gets_flatten() {
        let (mut g, ids) = chain(&[LayerKind::DataCsv, LayerKind::Lstm, LayerKind::Dense]);
        g.set_config(
            &ids[0],
            LayerConfig::from_value(
                LayerKind::DataCsv,
                serde_json::json!({ "timeSteps": 10, "features": 8 }),
            )
            .unwrap(),
        )
        .unwrap();
        g.set_config(
            &ids[1],
            LayerConfig::from_value(LayerKind::Lstm, serde_json::json!({ "returnSequences": true }))
                .unwrap(),
        )
        .unwrap();
        let s = prepare_for_generation(&g, ReshapePolicy::Permissive).unwrap();
        assert_eq!(
            s.kinds(),
            vec![LayerKind::Lstm, LayerKind::Flatten, LayerKind::Dense]
        );
    }
}
