// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the editing session.

use model_graph::NodeId;
use shape_inference::ConnectionError;

/// Errors that can occur while editing a model.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The graph rejected an edit.
    #[error("graph error: {0}")]
    Graph(#[from] model_graph::GraphError),

    /// A layer configuration could not be parsed.
    #[error("layer configuration error: {0}")]
    LayerConfig(#[from] layer_spec::ConfigError),

    /// A connection was rejected by shape validation.
    #[error("cannot connect '{from}' to '{to}': {reason}")]
    ConnectionRejected {
        from: NodeId,
        to: NodeId,
        #[source]
        reason: ConnectionError,
    },

    /// The configured node limit would be exceeded.
    #[error("node limit reached: the editor allows at most {limit} nodes")]
    TooManyNodes { limit: usize },

    /// The model cannot be generated.
    #[error("generation blocked: {0}")]
    Build(#[from] model_builder::BuildError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl EditorError {
    /// The rejected connection's error, if this is a rejection.
    pub fn connection_error(&self) -> Option<&ConnectionError> {
        match self {
            Self::ConnectionRejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
