// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Validation of a single candidate edge.

use crate::{ConnectionError, ReshapePolicy};
use layer_spec::{compute_output_shape, needs_flatten, LayerConfig, LayerSpec};
use tensor_shape::Shape;

/// Shapes on both sides of an accepted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// What the source hands to the target.
    pub source_output: Shape,
    /// What the target produces from it.
    pub target_output: Shape,
}

/// Decides whether `source` may feed `target`.
///
/// `source_output` is the source's already-computed output shape. When it
/// is `None` the shape is computed from `source` alone, which only
/// succeeds for data sources.
///
/// # Checks (in order)
/// 1. The target accepts inputs at all.
/// 2. The source shape is known.
/// 3. The source rank is one the target accepts. A dense target fed a
///    non-2D shape is reported as [`ConnectionError::NeedsFlatten`].
/// 4. For reshape targets, input and target element counts agree
///    (see [`ReshapePolicy`] for unknown counts).
/// 5. The target output has no zero-extent axis.
pub fn validate_connection(
    source: &LayerConfig,
    target: &LayerConfig,
    source_output: Option<&Shape>,
    policy: ReshapePolicy,
) -> Result<Connection, ConnectionError> {
    let target_kind = target.kind();
    let spec = LayerSpec::of(target_kind);
    if !spec.is_target() {
        return Err(ConnectionError::NotATarget { kind: target_kind });
    }

    let source_output = match source_output {
        Some(shape) => shape.clone(),
        None => compute_output_shape(source, None).ok_or(
            ConnectionError::UnresolvedSourceShape {
                source_kind: source.kind(),
            },
        )?,
    };

    let rank = source_output.rank();
    if !spec.accepts_rank(rank) {
        if needs_flatten(rank, target_kind) {
            return Err(ConnectionError::NeedsFlatten {
                source_kind: source.kind(),
                target: target_kind,
                rank,
                shape: source_output,
            });
        }
        return Err(ConnectionError::RankMismatch {
            source_kind: source.kind(),
            target: target_kind,
            expected: spec.accepted_ranks_text(),
            rank,
            shape: source_output,
        });
    }

    if let LayerConfig::Reshape(reshape) = target {
        let input_elements = source_output.known_feature_elements();
        let target_elements = reshape.target_shape.element_count();
        let compatible = match (input_elements, target_elements) {
            (Some(a), Some(b)) => a == b,
            _ => policy == ReshapePolicy::Permissive,
        };
        if !compatible {
            return Err(ConnectionError::ReshapeMismatch {
                input: source_output,
                target: reshape.target_shape.clone(),
                input_elements,
                target_elements,
            });
        }
    }

    let target_output = compute_output_shape(target, Some(&source_output)).ok_or(
        ConnectionError::UnresolvedSourceShape {
            source_kind: source.kind(),
        },
    )?;

    if target_output.has_empty_axis() {
        return Err(ConnectionError::CollapsedShape {
            kind: target_kind,
            input: source_output,
            output: target_output,
        });
    }

    Ok(Connection {
        source_output,
        target_output,
    })
}
