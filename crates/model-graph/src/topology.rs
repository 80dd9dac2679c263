// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph traversal helpers over node and edge slices.
//!
//! Edges whose endpoints are not in the node list ("dangling" edges, which
//! can appear in hand-edited documents) are ignored by every function here.

use crate::{Edge, LayerNode, NodeId};
use std::collections::{HashMap, HashSet, VecDeque};

/// `true` if both endpoints of `edge` exist in `known`.
pub fn is_attached(edge: &Edge, known: &HashSet<&NodeId>) -> bool {
    known.contains(&edge.source) && known.contains(&edge.target)
}

/// Ids of all nodes, for use with [`is_attached`].
pub fn node_ids(nodes: &[LayerNode]) -> HashSet<&NodeId> {
    nodes.iter().map(|n| &n.id).collect()
}

/// Edges with a missing endpoint.
pub fn dangling_edges<'a>(nodes: &[LayerNode], edges: &'a [Edge]) -> Vec<&'a Edge> {
    let known = node_ids(nodes);
    edges.iter().filter(|e| !is_attached(e, &known)).collect()
}

/// Number of incoming edges for every node (zero included).
pub fn in_degrees<'a>(nodes: &'a [LayerNode], edges: &[Edge]) -> HashMap<&'a NodeId, usize> {
    let mut degrees: HashMap<&NodeId, usize> = nodes.iter().map(|n| (&n.id, 0)).collect();
    for edge in edges {
        if !degrees.contains_key(&edge.source) {
            continue;
        }
        if let Some(d) = degrees.get_mut(&edge.target) {
            *d += 1;
        }
    }
    degrees
}

/// Incoming edges of `id`, in edge-list order.
pub fn incoming<'a>(edges: &'a [Edge], id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
    edges.iter().filter(move |e| &e.target == id)
}

/// The first incoming edge of `id` in edge-list order.
pub fn first_incoming<'a>(edges: &'a [Edge], id: &NodeId) -> Option<&'a Edge> {
    edges.iter().find(|e| &e.target == id)
}

/// Direct successors of `id`, in edge-list order.
pub fn successors<'a>(edges: &'a [Edge], id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
    edges.iter().filter(move |e| &e.source == id).map(|e| &e.target)
}

/// Every node reachable from `seeds` (seeds included), breadth first.
pub fn reachable_from<'a>(
    nodes: &'a [LayerNode],
    edges: &'a [Edge],
    seeds: impl IntoIterator<Item = &'a NodeId>,
) -> HashSet<&'a NodeId> {
    let known = node_ids(nodes);
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut queue: VecDeque<&NodeId> = VecDeque::new();
    for seed in seeds {
        if known.contains(seed) && visited.insert(seed) {
            queue.push_back(seed);
        }
    }
    while let Some(current) = queue.pop_front() {
        for edge in edges.iter().filter(|e| &e.source == current) {
            if known.contains(&edge.target) && visited.insert(&edge.target) {
                queue.push_back(&edge.target);
            }
        }
    }
    visited
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Finds a directed cycle, returning the nodes on it in traversal order.
///
/// Iterative three-colour depth-first search; roots are tried in node
/// order so the result is deterministic.
pub fn find_cycle(nodes: &[LayerNode], edges: &[Edge]) -> Option<Vec<NodeId>> {
    let known = node_ids(nodes);
    let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
    for edge in edges.iter().filter(|e| is_attached(e, &known)) {
        adjacency.entry(&edge.source).or_default().push(&edge.target);
    }

    let mut marks: HashMap<&NodeId, Mark> = HashMap::new();
    for root in nodes {
        if marks.contains_key(&root.id) {
            continue;
        }
        marks.insert(&root.id, Mark::InProgress);
        let mut path: Vec<&NodeId> = vec![&root.id];
        let mut cursor: Vec<usize> = vec![0];

        while let Some(&current) = path.last() {
            let depth = path.len() - 1;
            let next = adjacency
                .get(current)
                .and_then(|succ| succ.get(cursor[depth]))
                .copied();
            match next {
                Some(next) => {
                    cursor[depth] += 1;
                    match marks.get(next) {
                        None => {
                            marks.insert(next, Mark::InProgress);
                            path.push(next);
                            cursor.push(0);
                        }
                        Some(Mark::InProgress) => {
                            let start = path.iter().position(|id| *id == next).unwrap_or(0);
                            return Some(path[start..].iter().map(|id| (*id).clone()).collect());
                        }
                        Some(Mark::Done) => {}
                    }
                }
                None => {
                    marks.insert(current, Mark::Done);
                    path.pop();
                    cursor.pop();
                }
            }
        }
    }
    None
}
