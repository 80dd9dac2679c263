// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Target shapes for the reshape layer.

use std::fmt;
use tensor_shape::{parse_dims, Dim};

/// The non-batch axes a reshape layer produces.
///
/// Accepted forms:
/// - a list such as `[7, 4]` or `[null, 4]`, taken verbatim;
/// - text in Python tuple notation such as `"(None, 7, 4)"`. A leading
///   `None`/`null` there names the batch axis and is dropped, so
///   `"(None, 7, 4)"` and `[7, 4]` describe the same target.
///
/// Any other unknown axis (`None`, `null`, `-1`) stays unknown.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TargetRepr", into = "Vec<Dim>")]
pub struct TargetShape {
    dims: Vec<Dim>,
}

impl TargetShape {
    /// Creates a target from explicit axes (batch axis excluded).
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    /// Parses the textual tuple notation.
    pub fn parse(text: &str) -> Result<Self, tensor_shape::ShapeError> {
        let mut dims = parse_dims(text)?;
        if dims.len() > 1 && dims[0].is_none() && leading_token_is_batch(text) {
            dims.remove(0);
        }
        Ok(Self { dims })
    }

    /// The target axes, batch axis excluded.
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Number of target axes.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// `true` if the target names no axes.
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Product of the target axes, or `None` if any axis is unknown.
    pub fn element_count(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, d| d.and_then(|d| acc.checked_mul(d)))
    }
}

impl Default for TargetShape {
    fn default() -> Self {
        Self::new(vec![Some(7), Some(4)])
    }
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes: Vec<String> = self
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "None".to_string(), |d| d.to_string()))
            .collect();
        write!(f, "({})", axes.join(", "))
    }
}

impl From<TargetShape> for Vec<Dim> {
    fn from(t: TargetShape) -> Self {
        t.dims
    }
}

fn leading_token_is_batch(text: &str) -> bool {
    let first = text
        .trim()
        .trim_start_matches(['(', '['])
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    first == "none" || first == "null"
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    List(Vec<Option<i64>>),
    Text(String),
}

impl TryFrom<TargetRepr> for TargetShape {
    type Error = String;

    fn try_from(repr: TargetRepr) -> Result<Self, Self::Error> {
        match repr {
            TargetRepr::List(items) => items
                .into_iter()
                .map(|item| match item {
                    None | Some(-1) => Ok(None),
                    Some(n) => usize::try_from(n)
                        .map(Some)
                        .map_err(|_| format!("invalid target axis {n}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::new),
            TargetRepr::Text(text) => Self::parse(&text).map_err(|e| e.to_string()),
        }
    }
}
