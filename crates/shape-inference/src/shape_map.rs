// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-node propagation results.

use crate::{ConnectionError, GraphIssue};
use model_graph::NodeId;
use std::collections::HashMap;
use tensor_shape::Shape;

/// What propagation found for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeShape {
    /// The node's output is known. Data sources have no input.
    Resolved { input: Option<Shape>, output: Shape },
    /// The node cannot be connected as it is. `input` is the shape it was
    /// offered, when known.
    Failed {
        error: ConnectionError,
        input: Option<Shape>,
    },
}

impl NodeShape {
    pub fn input(&self) -> Option<&Shape> {
        match self {
            Self::Resolved { input, .. } | Self::Failed { input, .. } => input.as_ref(),
        }
    }

    pub fn output(&self) -> Option<&Shape> {
        match self {
            Self::Resolved { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ConnectionError> {
        match self {
            Self::Resolved { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Shapes (or errors) for every node reached from a data source, plus
/// graph-level issues.
///
/// Iteration follows visitation order. Nodes no data source reaches have
/// no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeMap {
    order: Vec<NodeId>,
    entries: HashMap<NodeId, NodeShape>,
    issues: Vec<GraphIssue>,
}

impl ShapeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result for `id`. The first record for a node wins.
    pub(crate) fn record(&mut self, id: NodeId, shape: NodeShape) {
        if self.entries.contains_key(&id) {
            return;
        }
        self.order.push(id.clone());
        self.entries.insert(id, shape);
    }

    pub(crate) fn add_issue(&mut self, issue: GraphIssue) {
        self.issues.push(issue);
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeShape> {
        self.entries.get(id)
    }

    /// The recorded output shape of `id`, if it resolved.
    pub fn output(&self, id: &NodeId) -> Option<&Shape> {
        self.get(id).and_then(NodeShape::output)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Entries in visitation order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeShape)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|shape| (id, shape)))
    }

    /// Failed nodes with their errors, in visitation order.
    pub fn errors(&self) -> Vec<(&NodeId, &ConnectionError)> {
        self.iter()
            .filter_map(|(id, shape)| shape.error().map(|e| (id, e)))
            .collect()
    }

    pub fn issues(&self) -> &[GraphIssue] {
        &self.issues
    }

    /// `true` if no node failed and the graph has no issues.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.entries.values().all(NodeShape::is_resolved)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
