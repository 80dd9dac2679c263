// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph linearization.

use crate::{ModelLayer, ModelStructure};
use model_graph::{topology, ConfigLookup, Edge, LayerNode, NodeId};

/// Linearizes a graph into processing layers ordered by sequence id.
///
/// # Algorithm
/// 1. Entry nodes are those without incoming edges. If every node has an
///    input (a cycle), the first node is used so that a malformed graph
///    still yields a structure.
/// 2. Breadth-first reachability from the entry nodes decides which nodes
///    are included. Data sources and the train trigger never are.
/// 3. Included layers are sorted by sequence id. Visitation order plays no
///    part in the result; equal sequence ids keep node-list order.
///
/// No structural or shape checks happen here; see
/// [`prepare_for_generation`](crate::prepare_for_generation).
pub fn extract_model_structure<C>(
    name: &str,
    nodes: &[LayerNode],
    edges: &[Edge],
    configs: &C,
) -> ModelStructure
where
    C: ConfigLookup + ?Sized,
{
    let degrees = topology::in_degrees(nodes, edges);
    let mut seeds: Vec<&NodeId> = nodes
        .iter()
        .filter(|n| degrees.get(&n.id).copied().unwrap_or(0) == 0)
        .map(|n| &n.id)
        .collect();
    if seeds.is_empty() {
        if let Some(first) = nodes.first() {
            tracing::warn!("no entry node found, starting from '{}'", first.id);
            seeds.push(&first.id);
        }
    }

    let reached = topology::reachable_from(nodes, edges, seeds);
    let mut layers: Vec<ModelLayer> = nodes
        .iter()
        .filter(|n| n.kind.is_processing() && reached.contains(&n.id))
        .map(|n| ModelLayer::from_node(n.id.clone(), n.sequence_id, configs.resolve(n).into_owned()))
        .collect();
    layers.sort_by_key(|l| l.sequence_id);

    tracing::debug!("extracted {} layers from {} nodes", layers.len(), nodes.len());
    ModelStructure::new(name, layers)
}
