// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # layer-spec
//!
//! The knowledge base describing every layer a user can drop onto the
//! model canvas:
//!
//! - [`LayerKind`]: the closed set of node types (data sources,
//!   transform layers, the training trigger).
//! - [`LayerConfig`]: a typed configuration record per kind, parsed and
//!   validated at the boundary so the shape engine never sees loose JSON.
//! - [`LayerSpec`]: the shape contract of a kind: accepted input ranks
//!   and a human label.
//! - [`compute_output_shape`]: pure output-shape inference from an input
//!   [`tensor_shape::Shape`] and a config.
//!
//! # Example
//! ```
//! use layer_spec::{compute_output_shape, Conv2dConfig, LayerConfig, Padding, Window};
//! use tensor_shape::Shape;
//!
//! let conv = LayerConfig::Conv2d(Conv2dConfig {
//!     kernel_size: Window::square(5),
//!     filters: 8,
//!     padding: Padding::Valid,
//!     ..Default::default()
//! });
//! let out = compute_output_shape(&conv, Some(&Shape::batched(&[28, 28, 1]))).unwrap();
//! assert_eq!(out, Shape::batched(&[24, 24, 8]));
//! ```

mod config;
mod error;
mod kind;
pub mod registry;
mod target_shape;
mod window;

pub use config::{
    ActivationConfig, BatchNormConfig, Conv2dConfig, CsvSourceConfig, DenseConfig, DropoutConfig,
    EmptyConfig, LayerConfig, Pool2dConfig, RecurrentConfig, ReshapeConfig,
};
pub use error::ConfigError;
pub use kind::LayerKind;
pub use registry::{compute_output_shape, needs_flatten, LayerSpec};
pub use target_shape::TargetShape;
pub use window::{window_output, Padding, Window};
