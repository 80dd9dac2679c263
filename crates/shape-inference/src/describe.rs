// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use layer_spec::{compute_output_shape, LayerConfig, LayerSpec};
use tensor_shape::Shape;

/// Tooltip text for a layer: its label plus the shape it produces.
///
/// ```
/// use layer_spec::{LayerConfig, LayerKind};
/// use shape_inference::layer_shape_description;
/// use tensor_shape::Shape;
///
/// let conv = LayerConfig::default_for(LayerKind::Conv2d);
/// let text = layer_shape_description(&conv, Some(&Shape::batched(&[28, 28, 1])));
/// assert_eq!(
///     text,
///     "2D convolution layer: 4D tensor (batch, 28, 28, 1) -> 4D tensor (batch, 24, 24, 8)"
/// );
/// ```
pub fn layer_shape_description(config: &LayerConfig, input: Option<&Shape>) -> String {
    let kind = config.kind();
    let spec = LayerSpec::of(kind);

    if kind.is_trigger() {
        return format!("{}: not part of the model", spec.label);
    }
    if kind.is_source() {
        return match compute_output_shape(config, None) {
            Some(output) => format!("{}: outputs {}", spec.label, output.description()),
            None => format!("{}: output unknown", spec.label),
        };
    }

    let Some(input) = input else {
        return format!(
            "{}: expects a {} input, not connected",
            spec.label,
            spec.accepted_ranks_text()
        );
    };
    if !spec.accepts_rank(input.rank()) {
        return format!(
            "{}: expects a {} input, got {}",
            spec.label,
            spec.accepted_ranks_text(),
            input.description()
        );
    }
    match compute_output_shape(config, Some(input)) {
        Some(output) => format!(
            "{}: {} -> {}",
            spec.label,
            input.description(),
            output.description()
        ),
        None => format!("{}: {} -> unknown", spec.label, input.description()),
    }
}
