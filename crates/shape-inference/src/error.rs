// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Connection and propagation errors.

use layer_spec::{LayerKind, TargetShape};
use model_graph::NodeId;
use tensor_shape::Shape;

/// Why a connection between two layers is not legal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The target kind takes no input (data sources, the train trigger).
    #[error("{kind} cannot be the target of a connection")]
    NotATarget { kind: LayerKind },

    /// The shape coming out of the source is not known.
    #[error("unresolved input shape: the output of the {source_kind} layer is unknown")]
    UnresolvedSourceShape { source_kind: LayerKind },

    /// The source rank is not one the target accepts.
    #[error("{target} expects a {expected} input, but {source_kind} outputs {shape} ({rank}D)")]
    RankMismatch {
        source_kind: LayerKind,
        target: LayerKind,
        expected: String,
        rank: usize,
        shape: Shape,
    },

    /// A dense layer fed by a non-2D source; a flatten layer fixes it.
    #[error("{target} expects a 2D input, but {source_kind} outputs {shape} ({rank}D); insert a flatten layer")]
    NeedsFlatten {
        source_kind: LayerKind,
        target: LayerKind,
        rank: usize,
        shape: Shape,
    },

    /// The reshape target does not hold the same number of elements.
    #[error("cannot reshape {input} to {target}: {} input elements vs {} target elements",
        count_text(.input_elements), count_text(.target_elements))]
    ReshapeMismatch {
        input: Shape,
        target: TargetShape,
        input_elements: Option<usize>,
        target_elements: Option<usize>,
    },

    /// A sliding window shrank an axis to nothing.
    #[error("{kind} turns {input} into {output}: the window is larger than the input")]
    CollapsedShape {
        kind: LayerKind,
        input: Shape,
        output: Shape,
    },
}

fn count_text(count: &Option<usize>) -> String {
    count.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An automatic graph edit that resolves a connection error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Remediation {
    /// Insert a flatten layer between source and target.
    InsertFlatten,
}

impl ConnectionError {
    /// The suggested fix, if there is a canonical one.
    pub fn remediation(&self) -> Option<Remediation> {
        match self {
            Self::NeedsFlatten { .. } => Some(Remediation::InsertFlatten),
            _ => None,
        }
    }
}

/// Problems with the graph as a whole, found during propagation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphIssue {
    /// Nothing seeds propagation.
    #[error("no data source: add an MNIST or CSV data node")]
    NoDataSource,

    /// The edges form a cycle; shapes along it are partial.
    #[error("the graph contains a cycle through: {}", join_ids(.0))]
    CyclicGraph(Vec<NodeId>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_only_for_flatten() {
        let shape = Shape::batched(&[24, 24, 8]);
        let flatten = ConnectionError::NeedsFlatten {
            source_kind: LayerKind::Conv2d,
            target: LayerKind::Dense,
            rank: 4,
            shape: shape.clone(),
        };
        assert_eq!(flatten.remediation(), Some(Remediation::InsertFlatten));

        let rank = ConnectionError::RankMismatch {
            source_kind: LayerKind::Dense,
            target: LayerKind::Lstm,
            expected: "3D".into(),
            rank: 2,
            shape,
        };
        assert_eq!(rank.remediation(), None);
    }

    #[test]
    fn test_messages() {
        let err = ConnectionError::ReshapeMismatch {
            input: Shape::batched(&[9216]),
            target: TargetShape::new(vec![Some(50), Some(50)]),
            input_elements: Some(9216),
            target_elements: Some(2500),
        };
        assert_eq!(
            err.to_string(),
            "cannot reshape [None, 9216] to (50, 50): 9216 input elements vs 2500 target elements"
        );
        let issue = GraphIssue::CyclicGraph(vec!["a".into(), "b".into()]);
        assert!(issue.to_string().ends_with("a, b"));
    }
}
