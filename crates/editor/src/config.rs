// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Editor configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! reshape_policy = "permissive"
//! auto_insert_flatten = true
//! max_nodes = 64
//! ```
//!
//! Every key is optional.

use crate::EditorError;
use shape_inference::ReshapePolicy;
use std::path::Path;

/// Configuration for an editing session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// How reshapes with unknown element counts are judged.
    pub reshape_policy: ReshapePolicy,
    /// Insert a flatten layer when a connection fails with `NeedsFlatten`
    /// instead of rejecting it.
    pub auto_insert_flatten: bool,
    /// Upper bound on the number of nodes; unlimited when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<usize>,
}

impl EditorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EditorError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, EditorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| EditorError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, EditorError> {
        toml::to_string_pretty(self)
            .map_err(|e| EditorError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Rejects settings no session could work with.
    pub fn validate(&self) -> Result<(), EditorError> {
        if self.max_nodes == Some(0) {
            return Err(EditorError::ConfigError(
                "max_nodes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `true` if a graph of `count` nodes is within the limit.
    pub fn allows(&self, count: usize) -> bool {
        !matches!(self.max_nodes, Some(limit) if count > limit)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            reshape_policy: ReshapePolicy::Permissive,
            auto_insert_flatten: true,
            max_nodes: None,
        }
    }
}
