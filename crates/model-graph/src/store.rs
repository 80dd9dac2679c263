// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-node configuration keyed by node id.

use crate::{LayerNode, NodeId};
use layer_spec::{ConfigError, LayerConfig};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Read access to node configurations.
///
/// Shape inference and model extraction only need lookups, so they take
/// any `ConfigLookup` rather than a concrete store.
pub trait ConfigLookup {
    /// The stored configuration for `id`, if any.
    fn config(&self, id: &NodeId) -> Option<&LayerConfig>;

    /// The configuration for `node`, falling back to the kind's defaults
    /// when nothing (or a record of the wrong kind) is stored.
    fn resolve(&self, node: &LayerNode) -> Cow<'_, LayerConfig> {
        match self.config(&node.id) {
            Some(config) if config.kind() == node.kind => Cow::Borrowed(config),
            _ => Cow::Owned(LayerConfig::default_for(node.kind)),
        }
    }
}

/// Layer configurations keyed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    entries: BTreeMap<NodeId, LayerConfig>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `config` for `node`, replacing any previous entry.
    ///
    /// Rejects configs of a different kind than the node and configs that
    /// fail validation.
    pub fn insert(
        &mut self,
        node: &LayerNode,
        config: LayerConfig,
    ) -> Result<Option<LayerConfig>, ConfigError> {
        config.ensure_kind(node.kind)?;
        config.validate()?;
        Ok(self.entries.insert(node.id.clone(), config))
    }

    pub fn get(&self, id: &NodeId) -> Option<&LayerConfig> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &NodeId) -> Option<LayerConfig> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &LayerConfig)> {
        self.entries.iter()
    }
}

impl ConfigLookup for ConfigStore {
    fn config(&self, id: &NodeId) -> Option<&LayerConfig> {
        self.get(id)
    }
}

impl ConfigLookup for BTreeMap<NodeId, LayerConfig> {
    fn config(&self, id: &NodeId) -> Option<&LayerConfig> {
        self.get(id)
    }
}
