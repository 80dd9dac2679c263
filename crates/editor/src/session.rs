// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The editing session.

use crate::{EditorConfig, EditorError};
use layer_spec::{LayerConfig, LayerKind};
use model_builder::{prepare_for_generation, ModelStructure};
use model_graph::{Draft, Edge, EdgeId, GraphDocument, LayerNode, ModelGraph, NodeId};
use shape_inference::{
    calculate_graph_shapes, layer_shape_description, validate_connection, Connection,
    ConnectionError, Remediation, ShapeMap,
};
use std::path::Path;
use tensor_shape::Shape;

/// What a successful [`EditorSession::connect`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The edge was added as drawn.
    Connected { edge: EdgeId, output: Shape },
    /// A flatten layer was placed between source and target.
    InsertedFlatten { flatten: NodeId, output: Shape },
}

/// A model being edited, with shapes kept current after every change.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    graph: ModelGraph<Draft>,
    shapes: ShapeMap,
}

impl EditorSession {
    /// Starts an empty session.
    pub fn new(name: impl Into<String>, config: EditorConfig) -> Self {
        let graph = ModelGraph::new(name);
        tracing::info!(
            "editor session '{}' created (reshape policy: {})",
            graph.name,
            config.reshape_policy
        );
        Self::with_graph(graph, config)
    }

    /// Starts a session on an existing graph.
    pub fn from_graph(graph: ModelGraph<Draft>, config: EditorConfig) -> Result<Self, EditorError> {
        if let Some(limit) = config.max_nodes {
            if !config.allows(graph.len()) {
                return Err(EditorError::TooManyNodes { limit });
            }
        }
        tracing::info!("editor session opened: {}", graph.summary());
        Ok(Self::with_graph(graph, config))
    }

    /// Starts a session from a graph document.
    pub fn from_document(document: GraphDocument, config: EditorConfig) -> Result<Self, EditorError> {
        Self::from_graph(document.into_graph()?, config)
    }

    /// Starts a session from a graph document on disk.
    pub fn open(path: &Path, config: EditorConfig) -> Result<Self, EditorError> {
        Self::from_document(GraphDocument::from_file(path)?, config)
    }

    fn with_graph(graph: ModelGraph<Draft>, config: EditorConfig) -> Self {
        let shapes = calculate_graph_shapes(&graph, config.reshape_policy);
        Self {
            config,
            graph,
            shapes,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &ModelGraph<Draft> {
        &self.graph
    }

    /// Shapes as of the last mutation.
    pub fn shapes(&self) -> &ShapeMap {
        &self.shapes
    }

    /// Snapshot of the graph as a document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from_graph(&self.graph)
    }

    /// Adds a node; `None` uses the kind's default configuration.
    pub fn add_node(
        &mut self,
        kind: LayerKind,
        config: Option<LayerConfig>,
    ) -> Result<NodeId, EditorError> {
        self.ensure_room(1)?;
        let id = self.graph.add_node(kind, config)?;
        self.refresh();
        Ok(id)
    }

    /// Removes a node with its configuration and edges.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<LayerNode, EditorError> {
        let node = self.graph.remove_node(id)?;
        self.refresh();
        Ok(node)
    }

    /// Checks a connection without changing anything.
    ///
    /// Runs the graph-level checks (existing nodes, no self loop, no
    /// duplicate, single input) and then shape validation against the
    /// current shapes.
    pub fn check_connection(
        &self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<Connection, EditorError> {
        self.graph.check_connectable(source, target)?;
        self.validate_pair(source, target)
    }

    /// Connects `source` to `target` if the shapes allow it.
    ///
    /// A rejected connection leaves the graph unchanged. When the only
    /// problem is a missing flatten and `auto_insert_flatten` is set, a
    /// flatten layer is inserted between the two nodes instead.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<ConnectOutcome, EditorError> {
        match self.check_connection(source, target) {
            Ok(connection) => {
                let edge = self.graph.connect(source, target)?;
                self.refresh();
                Ok(ConnectOutcome::Connected {
                    edge,
                    output: connection.target_output,
                })
            }
            Err(err)
                if self.config.auto_insert_flatten
                    && err.connection_error().and_then(ConnectionError::remediation)
                        == Some(Remediation::InsertFlatten) =>
            {
                self.connect_through_flatten(source, target)
            }
            Err(err) => {
                tracing::debug!("connection rejected: {err}");
                Err(err)
            }
        }
    }

    /// Removes an edge.
    pub fn disconnect(&mut self, id: &EdgeId) -> Result<Edge, EditorError> {
        let edge = self.graph.disconnect(id)?;
        self.refresh();
        Ok(edge)
    }

    /// Replaces a node's configuration.
    pub fn update_config(&mut self, id: &NodeId, config: LayerConfig) -> Result<(), EditorError> {
        self.graph.set_config(id, config)?;
        self.refresh();
        Ok(())
    }

    /// Replaces a node's configuration from its JSON form.
    pub fn update_config_json(
        &mut self,
        id: &NodeId,
        value: serde_json::Value,
    ) -> Result<(), EditorError> {
        let kind = self
            .graph
            .node(id)
            .map(|n| n.kind)
            .ok_or_else(|| model_graph::GraphError::NodeNotFound(id.clone()))?;
        let config = LayerConfig::from_value(kind, value)?;
        self.update_config(id, config)
    }

    /// Tooltip text for a node, using its current input shape.
    pub fn describe_node(&self, id: &NodeId) -> Result<String, EditorError> {
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| model_graph::GraphError::NodeNotFound(id.clone()))?;
        let input = self.shapes.get(id).and_then(|s| s.input());
        Ok(layer_shape_description(&self.graph.config_for(node), input))
    }

    /// Runs the generation gate on the current graph.
    pub fn generate(&self) -> Result<ModelStructure, EditorError> {
        let structure = prepare_for_generation(&self.graph, self.config.reshape_policy)?;
        tracing::info!("generated {} layers for '{}'", structure.len(), self.graph.name);
        Ok(structure)
    }

    fn connect_through_flatten(
        &mut self,
        source: &NodeId,
        target: &NodeId,
    ) -> Result<ConnectOutcome, EditorError> {
        self.ensure_room(1)?;

        // Both halves must hold before anything is committed.
        let flatten_config = LayerConfig::default_for(LayerKind::Flatten);
        let into_flatten = self.validate_configs(source, &flatten_config, target)?;
        let target_node = self.node(target)?;
        let out_of_flatten = validate_connection(
            &flatten_config,
            &self.graph.config_for(target_node),
            Some(&into_flatten.target_output),
            self.config.reshape_policy,
        )
        .map_err(|reason| EditorError::ConnectionRejected {
            from: source.clone(),
            to: target.clone(),
            reason,
        })?;

        let edge = self.graph.connect(source, target)?;
        let flatten = self.graph.insert_between(&edge, LayerKind::Flatten, None)?;
        tracing::info!(
            "inserted flatten '{}' between '{}' and '{}'",
            flatten,
            source,
            target
        );
        self.refresh();
        Ok(ConnectOutcome::InsertedFlatten {
            flatten,
            output: out_of_flatten.target_output,
        })
    }

    fn validate_pair(&self, source: &NodeId, target: &NodeId) -> Result<Connection, EditorError> {
        let target_config = self.graph.config_for(self.node(target)?);
        self.validate_configs(source, &target_config, target)
    }

    fn validate_configs(
        &self,
        source: &NodeId,
        target_config: &LayerConfig,
        target: &NodeId,
    ) -> Result<Connection, EditorError> {
        let source_config = self.graph.config_for(self.node(source)?);
        validate_connection(
            &source_config,
            target_config,
            self.shapes.output(source),
            self.config.reshape_policy,
        )
        .map_err(|reason| EditorError::ConnectionRejected {
            from: source.clone(),
            to: target.clone(),
            reason,
        })
    }

    fn node(&self, id: &NodeId) -> Result<&LayerNode, EditorError> {
        Ok(self
            .graph
            .node(id)
            .ok_or_else(|| model_graph::GraphError::NodeNotFound(id.clone()))?)
    }

    fn ensure_room(&self, extra: usize) -> Result<(), EditorError> {
        match self.config.max_nodes {
            Some(limit) if !self.config.allows(self.graph.len() + extra) => {
                Err(EditorError::TooManyNodes { limit })
            }
            _ => Ok(()),
        }
    }

    fn refresh(&mut self) {
        self.shapes = calculate_graph_shapes(&self.graph, self.config.reshape_policy);
        tracing::debug!(
            "shapes refreshed: {} nodes, {} errors",
            self.shapes.len(),
            self.shapes.errors().len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_spec::DenseConfig;
    use model_graph::GraphError;

    fn session() -> EditorSession {
        EditorSession::new("test", EditorConfig::default())
    }

    #[test]
    fn test_shapes_follow_mutations() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        assert!(s.shapes().contains(&data));

        let flat = s.add_node(LayerKind::Flatten, None).unwrap();
        assert!(!s.shapes().contains(&flat));

        s.connect(&data, &flat).unwrap();
        assert_eq!(s.shapes().output(&flat), Some(&Shape::batched(&[784])));

        let edge = s.graph().edges()[0].id.clone();
        s.disconnect(&edge).unwrap();
        assert!(!s.shapes().contains(&flat));

        s.remove_node(&data).unwrap();
        assert!(!s.shapes().is_clean());
    }

    #[test]
    fn test_connected_outcome_reports_output() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let pool = s.add_node(LayerKind::MaxPool2d, None).unwrap();
        match s.connect(&data, &pool).unwrap() {
            ConnectOutcome::Connected { output, .. } => {
                assert_eq!(output, Shape::batched(&[14, 14, 1]));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_rejected_connection_leaves_graph_unchanged() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let lstm = s.add_node(LayerKind::Lstm, None).unwrap();
        let err = s.connect(&data, &lstm).unwrap_err();
        assert!(matches!(
            err.connection_error(),
            Some(ConnectionError::RankMismatch { .. })
        ));
        assert!(s.graph().edges().is_empty());
    }

    #[test]
    fn test_needs_flatten_without_auto_insert() {
        let config = EditorConfig {
            auto_insert_flatten: false,
            ..EditorConfig::default()
        };
        let mut s = EditorSession::new("manual", config);
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        let err = s.connect(&data, &dense).unwrap_err();
        let reason = err.connection_error().unwrap();
        assert_eq!(reason.remediation(), Some(Remediation::InsertFlatten));
        assert_eq!(s.graph().len(), 2);
    }

    #[test]
    fn test_auto_insert_flatten() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        let outcome = s.connect(&data, &dense).unwrap();
        let ConnectOutcome::InsertedFlatten { flatten, output } = outcome else {
            panic!("expected a flatten insertion");
        };
        assert_eq!(output, Shape::batched(&[10]));
        assert_eq!(s.graph().node(&flatten).unwrap().sequence_id.value(), 0.5);
        assert_eq!(s.shapes().output(&flatten), Some(&Shape::batched(&[784])));
        assert!(s.shapes().is_clean());
    }

    #[test]
    fn test_graph_level_rejections() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let a = s.add_node(LayerKind::Flatten, None).unwrap();
        let b = s.add_node(LayerKind::Flatten, None).unwrap();
        s.connect(&data, &a).unwrap();
        assert!(matches!(
            s.connect(&data, &a),
            Err(EditorError::Graph(GraphError::DuplicateEdge { .. }))
        ));
        assert!(matches!(
            s.connect(&a, &a),
            Err(EditorError::Graph(GraphError::SelfLoop(_)))
        ));
        s.connect(&data, &b).unwrap();
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        s.connect(&a, &dense).unwrap();
        assert!(matches!(
            s.connect(&b, &dense),
            Err(EditorError::Graph(GraphError::MultipleInputs { .. }))
        ));
    }

    #[test]
    fn test_connect_into_source_is_rejected() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let flat = s.add_node(LayerKind::Flatten, None).unwrap();
        s.connect(&data, &flat).unwrap();
        let csv = s.add_node(LayerKind::DataCsv, None).unwrap();
        let err = s.connect(&flat, &csv).unwrap_err();
        assert!(matches!(
            err.connection_error(),
            Some(ConnectionError::NotATarget { .. })
        ));
    }

    #[test]
    fn test_update_config_repropagates() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let flat = s.add_node(LayerKind::Flatten, None).unwrap();
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        s.connect(&data, &flat).unwrap();
        s.connect(&flat, &dense).unwrap();
        assert_eq!(s.shapes().output(&dense), Some(&Shape::batched(&[10])));

        s.update_config(
            &dense,
            LayerConfig::Dense(DenseConfig {
                units: 32,
                ..DenseConfig::default()
            }),
        )
        .unwrap();
        assert_eq!(s.shapes().output(&dense), Some(&Shape::batched(&[32])));

        s.update_config_json(&dense, serde_json::json!({ "units": 5 }))
            .unwrap();
        assert_eq!(s.shapes().output(&dense), Some(&Shape::batched(&[5])));

        assert!(matches!(
            s.update_config_json(&dense, serde_json::json!({ "units": "many" })),
            Err(EditorError::LayerConfig(_))
        ));
    }

    #[test]
    fn test_node_limit() {
        let config = EditorConfig {
            max_nodes: Some(2),
            ..EditorConfig::default()
        };
        let mut s = EditorSession::new("small", config);
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        assert!(matches!(
            s.add_node(LayerKind::Dropout, None),
            Err(EditorError::TooManyNodes { limit: 2 })
        ));
        // The automatic flatten would be a third node.
        assert!(matches!(
            s.connect(&data, &dense),
            Err(EditorError::TooManyNodes { limit: 2 })
        ));
    }

    #[test]
    fn test_describe_node() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        let conv = s.add_node(LayerKind::Conv2d, None).unwrap();
        assert!(s.describe_node(&conv).unwrap().contains("not connected"));
        s.connect(&data, &conv).unwrap();
        assert_eq!(
            s.describe_node(&conv).unwrap(),
            "2D convolution layer: 4D tensor (batch, 28, 28, 1) -> 4D tensor (batch, 24, 24, 8)"
        );
    }

    #[test]
    fn test_generate_blocked_then_ok() {
        let mut s = session();
        let data = s.add_node(LayerKind::DataMnist, None).unwrap();
        assert!(matches!(s.generate(), Err(EditorError::Build(_))));
        let dense = s.add_node(LayerKind::Dense, None).unwrap();
        s.connect(&data, &dense).unwrap();
        let model = s.generate().unwrap();
        assert_eq!(model.kinds(), vec![LayerKind::Flatten, LayerKind::Dense]);
    }
}
