// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # shape-inference
//!
//! Decides whether layers may be connected and propagates tensor shapes
//! through a whole graph.
//!
//! - [`validate_connection`]: pure check of one candidate edge, used both
//!   interactively (before an edge is committed) and in bulk.
//! - [`calculate_model_shapes`]: breadth-first propagation from every data
//!   source, producing a [`ShapeMap`]. Failures are recorded per node and
//!   never abort the rest of the graph.
//! - [`layer_shape_description`]: tooltip text for a layer.
//!
//! # Example
//! ```
//! use layer_spec::{LayerConfig, LayerKind};
//! use shape_inference::{validate_connection, ConnectionError, ReshapePolicy};
//!
//! let conv = LayerConfig::default_for(LayerKind::Conv2d);
//! let dense = LayerConfig::default_for(LayerKind::Dense);
//! let conv_out = "[None, 24, 24, 8]".parse().unwrap();
//!
//! let err = validate_connection(&conv, &dense, Some(&conv_out), ReshapePolicy::Permissive)
//!     .unwrap_err();
//! assert!(matches!(err, ConnectionError::NeedsFlatten { .. }));
//! assert!(err.remediation().is_some());
//! ```

mod connection;
mod describe;
mod error;
mod policy;
mod propagate;
mod shape_map;

pub use connection::{validate_connection, Connection};
pub use describe::layer_shape_description;
pub use error::{ConnectionError, GraphIssue, Remediation};
pub use policy::ReshapePolicy;
pub use propagate::{calculate_graph_shapes, calculate_model_shapes};
pub use shape_map::{NodeShape, ShapeMap};
