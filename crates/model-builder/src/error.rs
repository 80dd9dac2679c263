// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model generation.

use model_graph::{GraphError, NodeId};
use shape_inference::{ConnectionError, GraphIssue};

/// Why a graph cannot be turned into a model.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The graph failed structural validation.
    #[error("invalid model structure: {0}")]
    Structure(#[from] GraphError),

    /// Propagation found a problem with the graph as a whole.
    #[error("invalid model graph: {0}")]
    Graph(#[from] GraphIssue),

    /// One or more layers have shape errors.
    #[error("shape errors in {}", describe_failures(.0))]
    ShapeErrors(Vec<(NodeId, ConnectionError)>),

    /// Extraction produced no layers.
    #[error("the model has no layers to generate")]
    EmptyStructure,

    /// Serializing the structure failed.
    #[error("failed to serialize model structure: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn describe_failures(failures: &[(NodeId, ConnectionError)]) -> String {
    failures
        .iter()
        .map(|(id, err)| format!("'{id}' ({err})"))
        .collect::<Vec<_>>()
        .join(", ")
}
