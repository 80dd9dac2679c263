// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-graph
//!
//! The graph a user builds on the canvas, in a form the shape engine and
//! the model builder can consume:
//!
//! - [`LayerNode`] / [`Edge`]: nodes with stable ids and sequence ids,
//!   directed connections between them.
//! - [`ConfigStore`]: per-node [`layer_spec::LayerConfig`] records keyed
//!   **only** by [`NodeId`]; deleting a node deletes its entry, nothing is
//!   renumbered.
//! - [`ModelGraph`]: nodes + edges + configs with a **type-state
//!   pattern** (`Draft` → `Validated`).
//! - [`GraphDocument`]: the JSON canvas document.
//! - [`topology`]: in-degrees, incoming edges, reachability and cycle
//!   detection shared by propagation and extraction.
//!
//! # Example
//! ```
//! use layer_spec::LayerKind;
//! use model_graph::ModelGraph;
//!
//! let mut graph = ModelGraph::new("mnist-mlp");
//! let data = graph.add_node(LayerKind::DataMnist, None).unwrap();
//! let flatten = graph.add_node(LayerKind::Flatten, None).unwrap();
//! let dense = graph.add_node(LayerKind::Dense, None).unwrap();
//! graph.connect(&data, &flatten).unwrap();
//! graph.connect(&flatten, &dense).unwrap();
//!
//! let validated = graph.validate().unwrap();
//! assert_eq!(validated.num_layers(), 2);
//! ```

mod document;
mod error;
pub mod graph;
mod node;
mod store;
pub mod topology;

pub use document::{DocumentEdge, DocumentNode, GraphDocument};
pub use error::GraphError;
pub use graph::{Draft, GraphState, ModelGraph, Validated};
pub use node::{Edge, EdgeId, LayerNode, NodeId, SequenceId};
pub use store::{ConfigLookup, ConfigStore};
