// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape contracts per layer kind.
//!
//! Everything here is pure: no I/O, no hidden state. Given a config and
//! (for non-source kinds) an input shape, [`compute_output_shape`] always
//! returns the same answer.
//!
//! # Output shape rules
//!
//! ```text
//! data-csv        [None, timeSteps, features]
//! data-mnist      [None, 28, 28, 1]
//! conv2d          [.., out(h), out(w), filters]
//! *-pool2d        [.., out(h), out(w), channels]
//! flatten         [None, product(non-batch axes)]
//! dense           [None, units]
//! lstm / gru      [None, steps, units] or [None, units]
//! reshape         [None, target...]
//! dropout etc.    unchanged
//! ```
//!
//! where `out(n) = floor((n - k) / s) + 1` for `valid` padding and
//! `ceil(n / s)` for `same`.

use crate::{window_output, LayerConfig, LayerKind, Padding, Window};
use tensor_shape::{Dim, Shape};

/// The shape contract of one layer kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub kind: LayerKind,
    /// Input ranks this kind accepts. Empty for kinds that cannot be the
    /// target of a connection.
    pub accepted_input_ranks: &'static [usize],
    /// Human-readable description for tooltips.
    pub label: &'static str,
}

/// Every spatial layer keeps the rank of its rank-3 or rank-4 input.
pub const SPATIAL_RANKS: &[usize] = &[3, 4];

const NONE: &[usize] = &[];
const MATRIX: &[usize] = &[2];
const SEQUENCE: &[usize] = &[3];
const ANY: &[usize] = &[2, 3, 4];

static SPECS: [LayerSpec; 14] = [
    LayerSpec {
        kind: LayerKind::DataCsv,
        accepted_input_ranks: NONE,
        label: "CSV data source",
    },
    LayerSpec {
        kind: LayerKind::DataMnist,
        accepted_input_ranks: NONE,
        label: "MNIST dataset",
    },
    LayerSpec {
        kind: LayerKind::Conv2d,
        accepted_input_ranks: SPATIAL_RANKS,
        label: "2D convolution layer",
    },
    LayerSpec {
        kind: LayerKind::MaxPool2d,
        accepted_input_ranks: SPATIAL_RANKS,
        label: "max pooling layer",
    },
    LayerSpec {
        kind: LayerKind::AvgPool2d,
        accepted_input_ranks: SPATIAL_RANKS,
        label: "average pooling layer",
    },
    LayerSpec {
        kind: LayerKind::Dense,
        accepted_input_ranks: MATRIX,
        label: "fully connected layer",
    },
    LayerSpec {
        kind: LayerKind::Dropout,
        accepted_input_ranks: ANY,
        label: "dropout regularisation layer",
    },
    LayerSpec {
        kind: LayerKind::BatchNorm,
        accepted_input_ranks: ANY,
        label: "batch normalisation layer",
    },
    LayerSpec {
        kind: LayerKind::Flatten,
        accepted_input_ranks: &[3, 4],
        label: "flatten layer",
    },
    LayerSpec {
        kind: LayerKind::Lstm,
        accepted_input_ranks: SEQUENCE,
        label: "long short-term memory layer",
    },
    LayerSpec {
        kind: LayerKind::Gru,
        accepted_input_ranks: SEQUENCE,
        label: "gated recurrent unit layer",
    },
    LayerSpec {
        kind: LayerKind::Activation,
        accepted_input_ranks: ANY,
        label: "activation layer",
    },
    LayerSpec {
        kind: LayerKind::Reshape,
        accepted_input_ranks: ANY,
        label: "reshape layer",
    },
    LayerSpec {
        kind: LayerKind::TrainTrigger,
        accepted_input_ranks: NONE,
        label: "training control",
    },
];

impl LayerSpec {
    /// Looks up the contract for a kind.
    pub fn of(kind: LayerKind) -> &'static LayerSpec {
        // SPECS is laid out in declaration order of `LayerKind`.
        &SPECS[kind as usize]
    }

    /// `true` if this kind can be the target of a connection.
    pub fn is_target(&self) -> bool {
        !self.accepted_input_ranks.is_empty()
    }

    /// `true` if an input of the given rank is acceptable.
    pub fn accepts_rank(&self, rank: usize) -> bool {
        self.accepted_input_ranks.contains(&rank)
    }

    /// Accepted ranks rendered for messages, e.g. `"3D or 4D"`.
    pub fn accepted_ranks_text(&self) -> String {
        let ranks: Vec<String> = self
            .accepted_input_ranks
            .iter()
            .map(|r| format!("{r}D"))
            .collect();
        ranks.join(" or ")
    }
}

/// `true` when a source of rank `source_rank` can only feed `target`
/// through a flatten layer.
///
/// This is the single rule behind both the interactive `NeedsFlatten`
/// rejection and the flatten that code generation inserts before a dense
/// layer following a spatial one.
pub fn needs_flatten(source_rank: usize, target: LayerKind) -> bool {
    target == LayerKind::Dense && source_rank != 2
}

/// Computes the output shape of a layer.
///
/// Source kinds ignore `input` and return their fixed descriptor. For
/// every other kind `None` means the shape cannot be determined at all:
/// the input is missing, has an unusable rank, or the kind (the training
/// trigger) produces no tensor. Unknown axes inside a returned shape are
/// a valid partial result.
pub fn compute_output_shape(config: &LayerConfig, input: Option<&Shape>) -> Option<Shape> {
    match config {
        LayerConfig::DataCsv(c) => Some(Shape::batched_dims(vec![Some(c.time_steps), c.features])),
        LayerConfig::DataMnist(_) => Some(Shape::batched(&[28, 28, 1])),
        LayerConfig::TrainTrigger(_) => None,
        LayerConfig::Conv2d(c) => {
            let input = input?;
            spatial_output(input, c.kernel_size, c.strides, c.padding, Some(c.filters))
        }
        LayerConfig::MaxPool2d(c) | LayerConfig::AvgPool2d(c) => {
            let input = input?;
            spatial_output(input, c.pool_size, c.effective_strides(), c.padding, None)
        }
        LayerConfig::Flatten(_) => {
            let input = input?;
            let batch = input.dims().first().copied().flatten();
            Some(Shape::new(vec![batch, input.known_feature_elements()]))
        }
        LayerConfig::Dense(c) => {
            let input = input?;
            let batch = input.dims().first().copied().flatten();
            Some(Shape::new(vec![batch, Some(c.units)]))
        }
        LayerConfig::Lstm(c) | LayerConfig::Gru(c) => {
            let input = input?;
            if input.rank() != 3 {
                return None;
            }
            let dims = input.dims();
            if c.return_sequences {
                Some(Shape::new(vec![dims[0], dims[1], Some(c.units)]))
            } else {
                Some(Shape::new(vec![dims[0], Some(c.units)]))
            }
        }
        LayerConfig::Reshape(c) => {
            let input = input?;
            let batch = input.dims().first().copied().flatten();
            let mut dims = Vec::with_capacity(c.target_shape.len() + 1);
            dims.push(batch);
            dims.extend_from_slice(c.target_shape.dims());
            Some(Shape::new(dims))
        }
        LayerConfig::Dropout(_) | LayerConfig::BatchNorm(_) | LayerConfig::Activation(_) => {
            input.cloned()
        }
    }
}

/// Height and width are the two axes before the channel axis, so rank-3
/// (`h, w, c`) and rank-4 (`batch, h, w, c`) inputs share one rule.
fn spatial_output(
    input: &Shape,
    window: Window,
    strides: Window,
    padding: Padding,
    channels: Option<usize>,
) -> Option<Shape> {
    let rank = input.rank();
    if !SPATIAL_RANKS.contains(&rank) {
        return None;
    }
    let dims = input.dims();
    let slide = |n: Dim, k: usize, s: usize| n.map(|n| window_output(n, k, s, padding));

    let mut out = dims.to_vec();
    out[rank - 3] = slide(dims[rank - 3], window.height, strides.height);
    out[rank - 2] = slide(dims[rank - 2], window.width, strides.width);
    if let Some(channels) = channels {
        out[rank - 1] = Some(channels);
    }
    Some(Shape::new(out))
}
