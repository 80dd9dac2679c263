// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph editing, document loading and structural
//! validation.

use crate::{EdgeId, NodeId};
use layer_spec::{ConfigError, LayerKind};

/// Errors that can occur when editing or validating a model graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The graph document could not be read.
    #[error("failed to read graph document: {0}")]
    DocumentReadError(#[from] std::io::Error),

    /// The graph document JSON is malformed.
    #[error("failed to parse graph document: {0}")]
    DocumentParseError(#[from] serde_json::Error),

    /// No node with this id exists.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// No edge with this id exists.
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// A node id is used twice.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// The same source and target are already connected.
    #[error("'{from}' is already connected to '{to}'")]
    DuplicateEdge { from: NodeId, to: NodeId },

    /// A node was connected to itself.
    #[error("node '{0}' cannot be connected to itself")]
    SelfLoop(NodeId),

    /// A node would receive (or has) more than one incoming edge.
    #[error("node '{node}' already has an input ({count} incoming edges)")]
    MultipleInputs { node: NodeId, count: usize },

    /// A node's configuration was rejected.
    #[error("invalid configuration for node '{node}': {source}")]
    InvalidConfig {
        node: NodeId,
        #[source]
        source: ConfigError,
    },

    /// The graph contains no nodes.
    #[error("the model is empty, add at least one layer")]
    EmptyGraph,

    /// The graph has no data-source node.
    #[error("no data source: add an MNIST or CSV data node")]
    NoDataSource,

    /// More than one data-source node exists.
    #[error("only one data source is allowed, found: {}", join_ids(.0))]
    MultipleDataSources(Vec<NodeId>),

    /// Only data and trigger nodes exist.
    #[error("the model has no processing layers")]
    NoProcessingLayer,

    /// The edges form a cycle through these nodes.
    #[error("the graph contains a cycle: {}", join_ids(.0))]
    CyclicGraph(Vec<NodeId>),

    /// An edge points into a node that cannot take an input.
    #[error("{kind} node '{node}' cannot be the target of a connection")]
    NotATarget { node: NodeId, kind: LayerKind },

    /// Processing layers not reachable from the data source.
    #[error("unconnected layers: {}", join_ids(.0))]
    UnconnectedNode(Vec<NodeId>),

    /// The final layer of the model is not a dense output layer.
    #[error("the last layer '{node}' is {kind}, the output layer must be dense")]
    OutputNotDense { node: NodeId, kind: LayerKind },
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
