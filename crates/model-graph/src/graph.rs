// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: the canvas as nodes, edges and per-node configuration.
//!
//! # Type-State Pattern
//!
//! ```text
//! ModelGraph<Draft>      : freely editable, may be structurally invalid.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  : one data source, acyclic, single input per
//!                          layer, everything connected, dense output.
//! ```
//!
//! A validated graph is known to pass [`ModelGraph::check_structure`].
//! The transition consumes the draft; [`ModelGraph::into_draft`] goes back
//! for further editing.

use crate::topology;
use crate::{ConfigLookup, ConfigStore, Edge, EdgeId, GraphError, LayerNode, NodeId, SequenceId};
use layer_spec::{LayerConfig, LayerKind};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph is being edited and has not been checked.
#[derive(Debug, Clone)]
pub struct Draft;

/// Marker: graph passed structural validation.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Draft {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// Layer nodes, the edges between them and their configurations.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Draft> {
    /// Human-readable model name.
    pub name: String,
    nodes: Vec<LayerNode>,
    edges: Vec<Edge>,
    configs: ConfigStore,
    next_node: u64,
    next_edge: u64,
    _state: PhantomData<S>,
}

// ── Shared accessors ───────────────────────────────────────────────

impl<S: GraphState> ModelGraph<S> {
    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[LayerNode] {
        &self.nodes
    }

    /// Edges in insertion order. Propagation relies on this order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn configs(&self) -> &ConfigStore {
        &self.configs
    }

    pub fn node(&self, id: &NodeId) -> Option<&LayerNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    /// The effective configuration of `node`: the stored entry, or the
    /// kind's defaults.
    pub fn config_for(&self, node: &LayerNode) -> Cow<'_, LayerConfig> {
        self.configs.resolve(node)
    }

    /// Data-source nodes, in node order.
    pub fn sources(&self) -> impl Iterator<Item = &LayerNode> {
        self.nodes.iter().filter(|n| n.kind.is_source())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Runs the structural checks without changing state.
    ///
    /// # Checks (in order, first failure wins)
    /// - The graph is non-empty.
    /// - Exactly one data source.
    /// - At least one processing layer.
    /// - No cycles.
    /// - No edge into a data source or the train trigger.
    /// - At most one incoming edge per node.
    /// - Every processing layer is reachable from the data source.
    /// - Every final processing layer is dense.
    pub fn check_structure(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        let sources: Vec<&LayerNode> = self.sources().collect();
        let source = match sources.as_slice() {
            [] => return Err(GraphError::NoDataSource),
            [only] => *only,
            many => {
                return Err(GraphError::MultipleDataSources(
                    many.iter().map(|n| n.id.clone()).collect(),
                ))
            }
        };

        if !self.nodes.iter().any(|n| n.kind.is_processing()) {
            return Err(GraphError::NoProcessingLayer);
        }

        if let Some(cycle) = topology::find_cycle(&self.nodes, &self.edges) {
            tracing::warn!("graph '{}' contains a cycle", self.name);
            return Err(GraphError::CyclicGraph(cycle));
        }

        let known = topology::node_ids(&self.nodes);
        for edge in self.edges.iter().filter(|e| topology::is_attached(e, &known)) {
            if let Some(target) = self.node(&edge.target) {
                if !target.kind.is_processing() {
                    return Err(GraphError::NotATarget {
                        node: target.id.clone(),
                        kind: target.kind,
                    });
                }
            }
        }

        let degrees = topology::in_degrees(&self.nodes, &self.edges);
        for node in &self.nodes {
            let count = degrees.get(&node.id).copied().unwrap_or(0);
            if count > 1 {
                return Err(GraphError::MultipleInputs {
                    node: node.id.clone(),
                    count,
                });
            }
        }

        let reached = topology::reachable_from(&self.nodes, &self.edges, [&source.id]);
        let unconnected: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.kind.is_processing() && !reached.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        if !unconnected.is_empty() {
            return Err(GraphError::UnconnectedNode(unconnected));
        }

        let feeds: HashSet<&NodeId> = self
            .edges
            .iter()
            .filter(|e| topology::is_attached(e, &known))
            .map(|e| &e.source)
            .collect();
        let mut sinks: Vec<&LayerNode> = self
            .nodes
            .iter()
            .filter(|n| n.kind.is_processing() && !feeds.contains(&n.id))
            .collect();
        sinks.sort_by_key(|n| n.sequence_id);
        if let Some(sink) = sinks.iter().find(|n| n.kind != LayerKind::Dense) {
            return Err(GraphError::OutputNotDense {
                node: sink.id.clone(),
                kind: sink.kind,
            });
        }

        Ok(())
    }

    /// One-line summary for logs and the CLI.
    pub fn summary(&self) -> String {
        let layers = self.nodes.iter().filter(|n| n.kind.is_processing()).count();
        format!(
            "{}: {} nodes ({} layers), {} edges",
            self.name,
            self.nodes.len(),
            layers,
            self.edges.len()
        )
    }

    /// Returns to (or stays in) the editable state.
    pub fn into_draft(self) -> ModelGraph<Draft> {
        self.transition()
    }

    fn transition<T: GraphState>(self) -> ModelGraph<T> {
        ModelGraph {
            name: self.name,
            nodes: self.nodes,
            edges: self.edges,
            configs: self.configs,
            next_node: self.next_node,
            next_edge: self.next_edge,
            _state: PhantomData,
        }
    }
}

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

// ── Draft state ────────────────────────────────────────────────────

impl ModelGraph<Draft> {
    /// Creates an empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            configs: ConfigStore::new(),
            next_node: 0,
            next_edge: 0,
            _state: PhantomData,
        }
    }

    /// Builds a graph from existing parts, as read from a document.
    ///
    /// Node ids must be unique and configs must match their node's kind.
    /// Edges are taken as-is: multiple incoming edges and dangling
    /// endpoints are tolerated here and reported by validation and
    /// propagation instead.
    pub fn from_parts(
        name: impl Into<String>,
        nodes: Vec<LayerNode>,
        edges: Vec<Edge>,
        configs: Vec<(NodeId, LayerConfig)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(name);
        for node in nodes {
            if graph.node(&node.id).is_some() {
                return Err(GraphError::DuplicateNode(node.id));
            }
            graph.nodes.push(node);
        }
        for (id, config) in configs {
            graph.set_config(&id, config)?;
        }
        for edge in &edges {
            if graph.node(&edge.source).is_none() || graph.node(&edge.target).is_none() {
                tracing::warn!(
                    "edge '{}' references a missing node ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
            }
        }
        graph.edges = edges;
        Ok(graph)
    }

    /// Adds a node of `kind` with a generated id and the next sequence id.
    ///
    /// `None` stores the kind's default configuration.
    pub fn add_node(
        &mut self,
        kind: LayerKind,
        config: Option<LayerConfig>,
    ) -> Result<NodeId, GraphError> {
        let id = self.fresh_node_id(kind);
        let sequence_id = self.next_sequence_id();
        self.add_node_with(id.clone(), kind, sequence_id, config)?;
        Ok(id)
    }

    /// Adds a node with an explicit id and sequence id.
    pub fn add_node_with(
        &mut self,
        id: NodeId,
        kind: LayerKind,
        sequence_id: SequenceId,
        config: Option<LayerConfig>,
    ) -> Result<(), GraphError> {
        if self.node(&id).is_some() {
            return Err(GraphError::DuplicateNode(id));
        }
        let node = LayerNode::new(id, kind, sequence_id);
        let config = config.unwrap_or_else(|| LayerConfig::default_for(kind));
        self.configs
            .insert(&node, config)
            .map_err(|source| GraphError::InvalidConfig {
                node: node.id.clone(),
                source,
            })?;
        tracing::debug!("added {} node '{}' at {}", kind, node.id, node.sequence_id);
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node together with its configuration and incident edges.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<LayerNode, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        let node = self.nodes.remove(index);
        self.configs.remove(id);
        let before = self.edges.len();
        self.edges.retain(|e| &e.source != id && &e.target != id);
        tracing::debug!(
            "removed node '{}' and {} incident edges",
            id,
            before - self.edges.len()
        );
        Ok(node)
    }

    /// Connects `source` to `target`.
    ///
    /// Rejects unknown endpoints, self loops, duplicate edges and a second
    /// incoming edge on `target`. Shape compatibility is not checked here.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<EdgeId, GraphError> {
        self.check_connectable(source, target)?;
        let id = self.fresh_edge_id();
        self.edges.push(Edge::new(id.clone(), source.clone(), target.clone()));
        tracing::debug!("connected '{}' -> '{}' as '{}'", source, target, id);
        Ok(id)
    }

    /// Runs the checks of [`connect`](Self::connect) without adding the edge.
    pub fn check_connectable(&self, source: &NodeId, target: &NodeId) -> Result<(), GraphError> {
        if self.node(source).is_none() {
            return Err(GraphError::NodeNotFound(source.clone()));
        }
        if self.node(target).is_none() {
            return Err(GraphError::NodeNotFound(target.clone()));
        }
        if source == target {
            return Err(GraphError::SelfLoop(source.clone()));
        }
        if self
            .edges
            .iter()
            .any(|e| &e.source == source && &e.target == target)
        {
            return Err(GraphError::DuplicateEdge {
                from: source.clone(),
                to: target.clone(),
            });
        }
        let count = topology::incoming(&self.edges, target).count();
        if count > 0 {
            return Err(GraphError::MultipleInputs {
                node: target.clone(),
                count: count + 1,
            });
        }
        Ok(())
    }

    /// Removes an edge.
    pub fn disconnect(&mut self, id: &EdgeId) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        Ok(self.edges.remove(index))
    }

    /// Replaces the configuration of node `id`.
    pub fn set_config(&mut self, id: &NodeId, config: LayerConfig) -> Result<(), GraphError> {
        let node = self
            .nodes
            .iter()
            .find(|n| &n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.clone()))?;
        self.configs
            .insert(node, config)
            .map_err(|source| GraphError::InvalidConfig {
                node: id.clone(),
                source,
            })?;
        Ok(())
    }

    /// Splits edge `id` by inserting a new node of `kind` in the middle.
    ///
    /// The new node's sequence id is the midpoint of its neighbours', so it
    /// lands between them in the generated model.
    pub fn insert_between(
        &mut self,
        id: &EdgeId,
        kind: LayerKind,
        config: Option<LayerConfig>,
    ) -> Result<NodeId, GraphError> {
        let edge = self
            .edge(id)
            .cloned()
            .ok_or_else(|| GraphError::EdgeNotFound(id.clone()))?;
        let before = self
            .node(&edge.source)
            .map(|n| n.sequence_id)
            .ok_or_else(|| GraphError::NodeNotFound(edge.source.clone()))?;
        let after = self
            .node(&edge.target)
            .map(|n| n.sequence_id)
            .ok_or_else(|| GraphError::NodeNotFound(edge.target.clone()))?;
        let sequence_id = if before < after {
            before.midpoint(after)
        } else {
            SequenceId::new(before.value() + 0.5)
        };

        let node_id = self.fresh_node_id(kind);
        self.add_node_with(node_id.clone(), kind, sequence_id, config)?;
        self.disconnect(id)?;
        self.connect(&edge.source, &node_id)?;
        self.connect(&node_id, &edge.target)?;
        tracing::debug!(
            "inserted {} '{}' between '{}' and '{}'",
            kind,
            node_id,
            edge.source,
            edge.target
        );
        Ok(node_id)
    }

    /// The sequence id a newly created node receives: one past the
    /// largest in use, or `0` for the first node.
    pub fn next_sequence_id(&self) -> SequenceId {
        self.nodes
            .iter()
            .map(|n| n.sequence_id)
            .max()
            .map_or(SequenceId::new(0.0), SequenceId::next_whole)
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// See [`check_structure`](Self::check_structure) for the checks.
    pub fn validate(self) -> Result<ModelGraph<Validated>, GraphError> {
        self.check_structure()?;
        tracing::info!("validated {}", self.summary());
        Ok(self.transition())
    }

    fn fresh_node_id(&mut self, kind: LayerKind) -> NodeId {
        loop {
            self.next_node += 1;
            let id = NodeId::new(format!("{}-{}", kind.as_str(), self.next_node));
            if self.node(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            self.next_edge += 1;
            let id = EdgeId::new(format!("edge-{}", self.next_edge));
            if self.edge(&id).is_none() {
                return id;
            }
        }
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Number of processing layers (data sources and the trigger excluded).
    pub fn num_layers(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind.is_processing()).count()
    }

    /// The single data source.
    pub fn data_source(&self) -> Option<&LayerNode> {
        self.sources().next()
    }
}
