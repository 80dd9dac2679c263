// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The ordered model handed to code generation.

use crate::BuildError;
use layer_spec::{needs_flatten, registry::SPATIAL_RANKS, LayerConfig, LayerKind};
use model_graph::{NodeId, SequenceId};
use std::fmt;

/// One layer of the generated model.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLayer {
    /// The canvas node this layer came from; `None` for layers inserted
    /// during generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub sequence_id: SequenceId,
    pub config: LayerConfig,
    /// `true` if generation inserted this layer.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub implicit: bool,
}

impl ModelLayer {
    /// A layer taken from a canvas node.
    pub fn from_node(node_id: NodeId, sequence_id: SequenceId, config: LayerConfig) -> Self {
        Self {
            node_id: Some(node_id),
            kind: config.kind(),
            sequence_id,
            config,
            implicit: false,
        }
    }

    /// A flatten layer inserted by generation.
    pub fn implicit_flatten(sequence_id: SequenceId) -> Self {
        Self {
            node_id: None,
            kind: LayerKind::Flatten,
            sequence_id,
            config: LayerConfig::default_for(LayerKind::Flatten),
            implicit: true,
        }
    }
}

/// Processing layers in generation order (ascending sequence id).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ModelStructure {
    pub name: String,
    pub layers: Vec<ModelLayer>,
}

impl ModelStructure {
    pub fn new(name: impl Into<String>, layers: Vec<ModelLayer>) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer kinds in order.
    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(|l| l.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelLayer> {
        self.layers.iter()
    }

    /// Inserts a flatten layer in front of every dense layer whose
    /// predecessor is spatial (conv or pooling).
    ///
    /// Spatial layers keep their 3D or 4D input rank, so this is the same
    /// rule that makes a direct spatial-to-dense connection fail with
    /// `NeedsFlatten`. Inserted layers sit halfway between their
    /// neighbours' sequence ids.
    pub fn with_implicit_flattens(self) -> Self {
        let mut layers: Vec<ModelLayer> = Vec::with_capacity(self.layers.len());
        for layer in self.layers {
            let insert = layers.last().is_some_and(|prev| {
                prev.kind.is_spatial()
                    && SPATIAL_RANKS
                        .iter()
                        .any(|&rank| needs_flatten(rank, layer.kind))
            });
            if insert {
                if let Some(prev) = layers.last() {
                    let sequence_id = prev.sequence_id.midpoint(layer.sequence_id);
                    tracing::debug!(
                        "inserting implicit flatten before {} at {}",
                        layer.kind,
                        sequence_id
                    );
                    layers.push(ModelLayer::implicit_flatten(sequence_id));
                }
            }
            layers.push(layer);
        }
        Self {
            name: self.name,
            layers,
        }
    }

    /// Pretty-printed JSON for the code generator.
    pub fn to_json(&self) -> Result<String, BuildError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ModelStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self.layers.iter().map(|l| l.kind.as_str()).collect();
        write!(f, "{} [{}]", self.name, kinds.join(" -> "))
    }
}
