// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-shape
//!
//! Shape descriptors for the tensors flowing between layers of a visual
//! model graph.
//!
//! This crate provides:
//! - [`Shape`]: rank plus per-axis extents, where any axis may be
//!   dynamic (`None`). Axis 0 is the batch axis by convention.
//! - [`parse_dims`]: parsing of textual dimension lists such as
//!   `"(None, 28, 28, 1)"` or `"[null, 10]"`.
//!
//! # Design Goals
//! - Unknown axes are a valid partial result, never an error.
//! - Element-count checks are conservative: an unknown axis means
//!   "cannot disprove", and callers decide what that implies.
//! - Clean error types via `thiserror`.

mod error;
mod shape;

pub use error::ShapeError;
pub use shape::{parse_dims, Dim, Shape};
