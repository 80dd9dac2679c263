// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layer configuration parsing and validation.

use crate::LayerKind;

/// Errors raised when a layer configuration is accepted from the outside.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The layer type tag is not one of the known kinds.
    #[error("unknown layer type '{0}'")]
    UnknownKind(String),

    /// The configuration payload does not match the kind's schema.
    #[error("malformed {kind} configuration: {source}")]
    Malformed {
        kind: LayerKind,
        #[source]
        source: serde_json::Error,
    },

    /// A field is present but its value is out of range.
    #[error("invalid {kind} option '{field}': {detail}")]
    InvalidValue {
        kind: LayerKind,
        field: &'static str,
        detail: String,
    },

    /// A configuration was attached to a node of a different kind.
    #[error("configuration for {found} cannot be used on a {expected} node")]
    KindMismatch {
        expected: LayerKind,
        found: LayerKind,
    },
}
