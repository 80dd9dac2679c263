// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sliding-window geometry shared by convolution and pooling layers.

use std::fmt;

/// Border handling for a sliding window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// No padding: the window must fit entirely inside the input.
    #[default]
    Valid,
    /// Zero padding so that the output covers every input position.
    Same,
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Same => f.write_str("same"),
        }
    }
}

/// A 2D extent (kernel size, pool size or stride) over height and width.
///
/// Deserializes from a single integer (`5`), a pair (`[2, 3]`) or the
/// textual tuple notation used by the canvas forms (`"(2, 2)"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "WindowRepr", into = "[usize; 2]")]
pub struct Window {
    pub height: usize,
    pub width: usize,
}

impl Window {
    /// Creates a window with distinct height and width.
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Creates a square window.
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    /// `true` if either extent is zero.
    pub fn is_degenerate(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.height == self.width {
            write!(f, "{}", self.height)
        } else {
            write!(f, "({}, {})", self.height, self.width)
        }
    }
}

impl From<Window> for [usize; 2] {
    fn from(w: Window) -> Self {
        [w.height, w.width]
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum WindowRepr {
    Single(usize),
    Pair([usize; 2]),
    Text(String),
}

impl TryFrom<WindowRepr> for Window {
    type Error = String;

    fn try_from(repr: WindowRepr) -> Result<Self, Self::Error> {
        match repr {
            WindowRepr::Single(n) => Ok(Self::square(n)),
            WindowRepr::Pair([h, w]) => Ok(Self::new(h, w)),
            WindowRepr::Text(text) => {
                let dims = tensor_shape::parse_dims(&text).map_err(|e| e.to_string())?;
                match dims.as_slice() {
                    [Some(n)] => Ok(Self::square(*n)),
                    [Some(h), Some(w)] => Ok(Self::new(*h, *w)),
                    _ => Err(format!("expected one or two known extents, got '{text}'")),
                }
            }
        }
    }
}

/// Output extent of one spatial axis under a sliding window.
///
/// - `valid`: `floor((n - k) / s) + 1`, or `0` when the window does not fit.
/// - `same`: `ceil(n / s)`.
///
/// A zero stride is treated as one; configs are validated before they
/// reach this point.
pub fn window_output(input: usize, kernel: usize, stride: usize, padding: Padding) -> usize {
    let stride = stride.max(1);
    match padding {
        Padding::Valid => {
            if input < kernel {
                0
            } else {
                (input - kernel) / stride + 1
            }
        }
        Padding::Same => input.div_ceil(stride),
    }
}
