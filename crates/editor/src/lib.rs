// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # editor
//!
//! The state container behind the canvas. An [`EditorSession`] owns the
//! graph being edited and the latest [`ShapeMap`](shape_inference::ShapeMap):
//!
//! - every mutation (add/remove node, connect, disconnect, config update)
//!   re-runs full shape propagation, so the map never mixes old and new
//!   topology;
//! - connections are checked before the edge is committed, and a
//!   spatial-to-dense connection can be repaired by inserting a flatten
//!   layer automatically;
//! - [`EditorSession::generate`] runs the generation gate.
//!
//! Behaviour is tuned through [`EditorConfig`], loaded from TOML.
//!
//! # Example
//! ```
//! use editor::{ConnectOutcome, EditorConfig, EditorSession};
//! use layer_spec::LayerKind;
//!
//! let mut session = EditorSession::new("mnist", EditorConfig::default());
//! let data = session.add_node(LayerKind::DataMnist, None).unwrap();
//! let conv = session.add_node(LayerKind::Conv2d, None).unwrap();
//! let dense = session.add_node(LayerKind::Dense, None).unwrap();
//! session.connect(&data, &conv).unwrap();
//!
//! let outcome = session.connect(&conv, &dense).unwrap();
//! assert!(matches!(outcome, ConnectOutcome::InsertedFlatten { .. }));
//! assert!(session.shapes().is_clean());
//! ```

mod config;
mod error;
mod session;

pub use config::EditorConfig;
pub use error::EditorError;
pub use session::{ConnectOutcome, EditorSession};
