// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for shape parsing.

/// Errors that can occur when building a [`crate::Shape`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The dimension list contained no axes at all.
    #[error("empty dimension list")]
    Empty,

    /// A token could not be read as an axis extent.
    #[error("invalid axis '{token}' at position {position}")]
    InvalidAxis { token: String, position: usize },
}
