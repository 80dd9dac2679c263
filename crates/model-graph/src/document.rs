// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON graph document, as saved by the canvas.
//!
//! # Format
//! ```json
//! {
//!   "name": "mnist-cnn",
//!   "nodes": [
//!     { "id": "data", "type": "data-mnist", "sequenceId": 0 },
//!     { "id": "conv", "type": "conv2d", "sequenceId": 1,
//!       "config": { "kernelSize": 5, "filters": 8 } },
//!     { "id": "out", "type": "dense", "sequenceId": 2,
//!       "config": { "units": 10 } }
//!   ],
//!   "edges": [
//!     { "id": "e1", "source": "data", "target": "conv" },
//!     { "source": "conv", "target": "out" }
//!   ]
//! }
//! ```
//!
//! `type` accepts canonical tags and legacy aliases (`maxPooling2d`, ...).
//! A missing `sequenceId` defaults to the node's position in the list, a
//! missing `config` to the kind's defaults, a missing edge `id` to
//! `edge-<n>`.

use crate::{Draft, Edge, EdgeId, GraphError, GraphState, LayerNode, ModelGraph, NodeId};
use layer_spec::{ConfigError, LayerConfig, LayerKind};
use std::path::Path;

/// Top-level graph document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_name")]
    pub name: String,
    pub nodes: Vec<DocumentNode>,
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

fn default_name() -> String {
    "untitled".to_string()
}

/// A node entry in the document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<f64>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

/// An edge entry in the document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocumentEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
}

impl GraphDocument {
    /// Loads a document from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, GraphError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let document: Self = serde_json::from_str(json)?;
        Ok(document)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds an editable graph.
    ///
    /// Layer types and configs are checked here, so everything past this
    /// point sees typed, validated configuration.
    pub fn into_graph(self) -> Result<ModelGraph<Draft>, GraphError> {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut configs = Vec::with_capacity(self.nodes.len());
        for (index, entry) in self.nodes.into_iter().enumerate() {
            let id = NodeId::new(entry.id);
            let kind = LayerKind::from_str_loose(&entry.layer_type).ok_or_else(|| {
                GraphError::InvalidConfig {
                    node: id.clone(),
                    source: ConfigError::UnknownKind(entry.layer_type.clone()),
                }
            })?;
            let config = LayerConfig::from_value(kind, entry.config).map_err(|source| {
                GraphError::InvalidConfig {
                    node: id.clone(),
                    source,
                }
            })?;
            let sequence_id = entry.sequence_id.unwrap_or(index as f64);
            nodes.push(LayerNode::new(id.clone(), kind, sequence_id));
            configs.push((id, config));
        }

        let edges = self
            .edges
            .into_iter()
            .enumerate()
            .map(|(index, e)| {
                let id = e
                    .id
                    .map(EdgeId::new)
                    .unwrap_or_else(|| EdgeId::new(format!("edge-{}", index + 1)));
                Edge::new(id, e.source, e.target)
            })
            .collect();

        let graph = ModelGraph::from_parts(self.name, nodes, edges, configs)?;
        tracing::info!("loaded graph document: {}", graph.summary());
        Ok(graph)
    }

    /// Captures a graph as a document, configs included.
    pub fn from_graph<S: GraphState>(graph: &ModelGraph<S>) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| DocumentNode {
                id: node.id.to_string(),
                layer_type: node.kind.as_str().to_string(),
                sequence_id: Some(node.sequence_id.value()),
                config: graph.config_for(node).to_value(),
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| DocumentEdge {
                id: Some(edge.id.to_string()),
                source: edge.source.to_string(),
                target: edge.target.to_string(),
            })
            .collect();
        Self {
            name: graph.name.clone(),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigLookup;

    const CNN: &str = r#"{
        "name": "mnist-cnn",
        "nodes": [
            { "id": "data", "type": "mnist", "sequenceId": 0 },
            { "id": "conv", "type": "conv2d", "sequenceId": 1,
              "config": { "kernelSize": 5, "filters": 8, "strides": 1,
                          "padding": "valid", "useBias": false } },
            { "id": "pool", "type": "maxPooling2d", "sequenceId": 2 },
            { "id": "flat", "type": "flatten", "sequenceId": 3 },
            { "id": "out", "type": "dense", "sequenceId": 4,
              "config": { "units": 10 } }
        ],
        "edges": [
            { "id": "e1", "source": "data", "target": "conv" },
            { "source": "conv", "target": "pool" },
            { "source": "pool", "target": "flat" },
            { "source": "flat", "target": "out" }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let graph = GraphDocument::from_json(CNN).unwrap().into_graph().unwrap();
        assert_eq!(graph.name, "mnist-cnn");
        assert_eq!(graph.nodes().len(), 5);
        assert_eq!(graph.nodes()[2].kind, LayerKind::MaxPool2d);
        assert_eq!(graph.edges()[0].id.as_str(), "e1");
        assert_eq!(graph.edges()[1].id.as_str(), "edge-2");

        let conv = graph.configs().config(&NodeId::from("conv")).unwrap();
        match conv {
            LayerConfig::Conv2d(c) => {
                assert_eq!(c.filters, 8);
                assert_eq!(c.extra["useBias"], false);
            }
            other => panic!("unexpected config {other:?}"),
        }
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let json = r#"{ "nodes": [ { "id": "x", "type": "transformer" } ] }"#;
        let err = GraphDocument::from_json(json).unwrap().into_graph().unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConfig {
                source: ConfigError::UnknownKind(_),
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let json = r#"{ "nodes": [
            { "id": "d", "type": "dense", "config": { "units": 0 } }
        ] }"#;
        let err = GraphDocument::from_json(json).unwrap().into_graph().unwrap_err();
        match err {
            GraphError::InvalidConfig { node, .. } => assert_eq!(node.as_str(), "d"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let json = r#"{ "nodes": [
            { "id": "a", "type": "data-csv" },
            { "id": "b", "type": "dense" }
        ] }"#;
        let graph = GraphDocument::from_json(json).unwrap().into_graph().unwrap();
        assert_eq!(graph.name, "untitled");
        assert_eq!(graph.nodes()[1].sequence_id.value(), 1.0);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_multiple_incoming_edges_are_tolerated() {
        let json = r#"{ "nodes": [
            { "id": "a", "type": "mnist" },
            { "id": "b", "type": "flatten" },
            { "id": "c", "type": "flatten" }
        ], "edges": [
            { "source": "a", "target": "c" },
            { "source": "b", "target": "c" }
        ] }"#;
        let graph = GraphDocument::from_json(json).unwrap().into_graph().unwrap();
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_from_graph_roundtrip_preserves_structure() {
        let graph = GraphDocument::from_json(CNN).unwrap().into_graph().unwrap();
        let json = GraphDocument::from_graph(&graph).to_json().unwrap();
        let again = GraphDocument::from_json(&json).unwrap().into_graph().unwrap();
        assert_eq!(again.nodes(), graph.nodes());
        assert_eq!(again.edges(), graph.edges());
        assert_eq!(again.configs(), graph.configs());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            GraphDocument::from_json("{ nodes: }"),
            Err(GraphError::DocumentParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = GraphDocument::from_file(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, GraphError::DocumentReadError(_)));
    }
}
