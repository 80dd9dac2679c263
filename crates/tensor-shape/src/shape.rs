// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape descriptors with dynamic axes and dimension-list parsing.

use crate::ShapeError;
use std::fmt;
use std::str::FromStr;

/// A single axis extent. `None` marks a dynamic axis (typically batch).
pub type Dim = Option<usize>;

/// Describes the shape of a tensor flowing out of a layer.
///
/// Axis 0 is the batch axis by convention and is usually dynamic. Any
/// other axis may also be unknown while the graph is being edited; such
/// a shape is still valid, it just cannot take part in exact
/// element-count comparisons.
///
/// # Examples
/// ```
/// use tensor_shape::Shape;
/// let s = Shape::batched(&[28, 28, 1]);
/// assert_eq!(s.rank(), 4);
/// assert_eq!(s.known_feature_elements(), Some(784));
/// assert_eq!(s.to_string(), "[None, 28, 28, 1]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: Vec<Dim>,
}

impl Shape {
    /// Creates a shape from explicit (possibly dynamic) axes.
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    /// Creates a shape with a dynamic batch axis followed by known axes.
    pub fn batched(features: &[usize]) -> Self {
        let mut dims = Vec::with_capacity(features.len() + 1);
        dims.push(None);
        dims.extend(features.iter().map(|&d| Some(d)));
        Self { dims }
    }

    /// Creates a shape with a dynamic batch axis followed by `features`,
    /// any of which may be unknown.
    pub fn batched_dims(features: Vec<Dim>) -> Self {
        let mut dims = Vec::with_capacity(features.len() + 1);
        dims.push(None);
        dims.extend(features);
        Self { dims }
    }

    /// Returns the number of axes.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns all axes, batch axis included.
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Returns the extent of one axis, or `None` if it is dynamic or out
    /// of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied().flatten()
    }

    /// Returns the non-batch axes.
    pub fn feature_dims(&self) -> &[Dim] {
        self.dims.get(1..).unwrap_or(&[])
    }

    /// Product of the non-batch axes, or `None` if any of them is unknown.
    ///
    /// A rank-1 shape (batch only) has one feature element.
    pub fn known_feature_elements(&self) -> Option<usize> {
        self.feature_dims()
            .iter()
            .try_fold(1usize, |acc, d| d.and_then(|d| acc.checked_mul(d)))
    }

    /// Returns `true` if every non-batch axis has a known extent.
    pub fn has_known_features(&self) -> bool {
        self.feature_dims().iter().all(Option::is_some)
    }

    /// Returns `true` if some axis has collapsed to zero elements.
    pub fn has_empty_axis(&self) -> bool {
        self.dims.iter().any(|d| *d == Some(0))
    }

    /// Human-readable rendering, e.g. `"4D tensor (batch, 28, 28, 1)"`.
    ///
    /// A dynamic batch axis is written as `batch`, other unknown axes as `?`.
    pub fn description(&self) -> String {
        let axes: Vec<String> = self
            .dims
            .iter()
            .enumerate()
            .map(|(i, d)| match (i, d) {
                (_, Some(d)) => d.to_string(),
                (0, None) => "batch".to_string(),
                (_, None) => "?".to_string(),
            })
            .collect();
        format!("{}D tensor ({})", self.rank(), axes.join(", "))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match d {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "None")?,
            }
        }
        write!(f, "]")
    }
}

impl FromStr for Shape {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dims(s).map(Self::new)
    }
}

/// Convenience: `Shape::from(vec![None, Some(10)])`.
impl From<Vec<Dim>> for Shape {
    fn from(dims: Vec<Dim>) -> Self {
        Self::new(dims)
    }
}

/// Parses a textual dimension list.
///
/// Accepts `(a, b)`, `[a, b]` or a bare `a, b`. The tokens `None`,
/// `null`, `?` and `-1` denote unknown axes. A single trailing comma is
/// tolerated, as in the one-element tuple `(7,)`.
///
/// # Examples
/// ```
/// use tensor_shape::parse_dims;
/// assert_eq!(parse_dims("(None, 7, 4)").unwrap(), vec![None, Some(7), Some(4)]);
/// assert_eq!(parse_dims("[10]").unwrap(), vec![Some(10)]);
/// ```
pub fn parse_dims(text: &str) -> Result<Vec<Dim>, ShapeError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .or_else(|| trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')))
        .unwrap_or(trimmed)
        .trim();

    if inner.is_empty() {
        return Err(ShapeError::Empty);
    }

    let mut tokens: Vec<&str> = inner.split(',').map(str::trim).collect();
    if tokens.len() > 1 && tokens.last().is_some_and(|t| t.is_empty()) {
        tokens.pop();
    }

    tokens
        .iter()
        .enumerate()
        .map(|(position, token)| parse_axis(token, position))
        .collect()
}

fn parse_axis(token: &str, position: usize) -> Result<Dim, ShapeError> {
    match token.to_ascii_lowercase().as_str() {
        "none" | "null" | "?" | "-1" => Ok(None),
        other => other
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ShapeError::InvalidAxis {
                token: token.to_string(),
                position,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batched_shape() {
        let s = Shape::batched(&[24, 24, 16]);
        assert_eq!(s.rank(), 4);
        assert_eq!(s.dim(0), None);
        assert_eq!(s.dim(3), Some(16));
        assert_eq!(s.dim(9), None);
        assert_eq!(s.feature_dims().len(), 3);
    }

    #[test]
    fn test_known_feature_elements() {
        assert_eq!(Shape::batched(&[24, 24, 16]).known_feature_elements(), Some(9216));

        let partial = Shape::batched_dims(vec![Some(7), None]);
        assert_eq!(partial.known_feature_elements(), None);
        assert!(!partial.has_known_features());

        // Batch only: the empty product.
        assert_eq!(Shape::new(vec![None]).known_feature_elements(), Some(1));
    }

    #[test]
    fn test_feature_elements_overflow_is_unknown() {
        let s = Shape::batched(&[usize::MAX, 2]);
        assert_eq!(s.known_feature_elements(), None);
    }

    #[test]
    fn test_empty_axis() {
        assert!(Shape::batched(&[0, 4]).has_empty_axis());
        assert!(!Shape::batched(&[1, 4]).has_empty_axis());
    }

    #[test]
    fn test_display() {
        let s = Shape::batched(&[28, 28, 1]);
        assert_eq!(format!("{s}"), "[None, 28, 28, 1]");
    }

    #[test]
    fn test_description() {
        assert_eq!(
            Shape::batched(&[28, 28, 1]).description(),
            "4D tensor (batch, 28, 28, 1)"
        );
        assert_eq!(
            Shape::batched_dims(vec![Some(7), None]).description(),
            "3D tensor (batch, 7, ?)"
        );
        assert_eq!(
            Shape::new(vec![Some(28), Some(28), Some(1)]).description(),
            "3D tensor (28, 28, 1)"
        );
    }

    #[test]
    fn test_parse_tuple() {
        assert_eq!(
            parse_dims("(None, 96, 96)").unwrap(),
            vec![None, Some(96), Some(96)]
        );
        assert_eq!(parse_dims("[null, 10]").unwrap(), vec![None, Some(10)]);
        assert_eq!(parse_dims(" 3 , -1 ").unwrap(), vec![Some(3), None]);
        assert_eq!(parse_dims("(7,)").unwrap(), vec![Some(7)]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_dims("()"), Err(ShapeError::Empty));
        assert_eq!(parse_dims("   "), Err(ShapeError::Empty));
        assert_eq!(
            parse_dims("(4, x)"),
            Err(ShapeError::InvalidAxis {
                token: "x".into(),
                position: 1
            })
        );
        assert!(parse_dims("(4,,2)").is_err());
    }

    #[test]
    fn test_from_str() {
        let s: Shape = "[None, 10, 8]".parse().unwrap();
        assert_eq!(s, Shape::batched(&[10, 8]));
    }

    #[test]
    fn test_serde_transparent() {
        let s = Shape::batched(&[10]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[null,10]");
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
