// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The closed set of node kinds that can appear on the model canvas.

/// The kind of a node in the model graph.
///
/// Data sources have no inputs and seed shape propagation. The training
/// trigger is a UI-only node that takes no part in the model itself.
/// Everything else is a processing layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Tabular / time-series data loaded from CSV.
    #[serde(alias = "useData")]
    DataCsv,
    /// The MNIST handwritten digit dataset.
    #[serde(alias = "mnist")]
    DataMnist,
    /// 2D convolution.
    #[serde(rename = "conv2d")]
    Conv2d,
    /// 2D max pooling.
    #[serde(rename = "max-pool2d", alias = "maxPooling2d")]
    MaxPool2d,
    /// 2D average pooling.
    #[serde(rename = "avg-pool2d", alias = "avgPooling2d")]
    AvgPool2d,
    /// Fully connected layer.
    Dense,
    /// Dropout regularisation.
    Dropout,
    /// Batch normalisation.
    #[serde(alias = "batchNorm")]
    BatchNorm,
    /// Collapses all non-batch axes into one.
    Flatten,
    /// Long short-term memory recurrent layer.
    Lstm,
    /// Gated recurrent unit layer.
    Gru,
    /// Standalone activation function.
    Activation,
    /// Reinterprets the non-batch axes with a new target shape.
    Reshape,
    /// The "train" button node. Not part of the model.
    #[serde(alias = "trainButton")]
    TrainTrigger,
}

impl LayerKind {
    /// Every kind, in canonical order.
    pub const ALL: [LayerKind; 14] = [
        Self::DataCsv,
        Self::DataMnist,
        Self::Conv2d,
        Self::MaxPool2d,
        Self::AvgPool2d,
        Self::Dense,
        Self::Dropout,
        Self::BatchNorm,
        Self::Flatten,
        Self::Lstm,
        Self::Gru,
        Self::Activation,
        Self::Reshape,
        Self::TrainTrigger,
    ];

    /// Parses a kind from a type tag.
    ///
    /// Accepts the canonical kebab-case tags (`"max-pool2d"`) as well as
    /// the camelCase tags used by older canvas documents
    /// (`"maxPooling2d"`, `"useData"`, `"trainButton"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "data-csv" | "csv" | "usedata" => Some(Self::DataCsv),
            "data-mnist" | "mnist" => Some(Self::DataMnist),
            "conv2d" | "conv-2d" | "conv" => Some(Self::Conv2d),
            "max-pool2d" | "maxpooling2d" | "maxpool2d" | "max-pooling2d" => Some(Self::MaxPool2d),
            "avg-pool2d" | "avgpooling2d" | "avgpool2d" | "average-pooling2d" => {
                Some(Self::AvgPool2d)
            }
            "dense" | "linear" => Some(Self::Dense),
            "dropout" => Some(Self::Dropout),
            "batch-norm" | "batchnorm" | "batch-normalization" => Some(Self::BatchNorm),
            "flatten" => Some(Self::Flatten),
            "lstm" => Some(Self::Lstm),
            "gru" => Some(Self::Gru),
            "activation" => Some(Self::Activation),
            "reshape" => Some(Self::Reshape),
            "train-trigger" | "trainbutton" | "train" => Some(Self::TrainTrigger),
            _ => None,
        }
    }

    /// Returns the canonical type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataCsv => "data-csv",
            Self::DataMnist => "data-mnist",
            Self::Conv2d => "conv2d",
            Self::MaxPool2d => "max-pool2d",
            Self::AvgPool2d => "avg-pool2d",
            Self::Dense => "dense",
            Self::Dropout => "dropout",
            Self::BatchNorm => "batch-norm",
            Self::Flatten => "flatten",
            Self::Lstm => "lstm",
            Self::Gru => "gru",
            Self::Activation => "activation",
            Self::Reshape => "reshape",
            Self::TrainTrigger => "train-trigger",
        }
    }

    /// `true` for data-origin kinds, which seed shape propagation.
    pub fn is_source(&self) -> bool {
        matches!(self, Self::DataCsv | Self::DataMnist)
    }

    /// `true` for the UI-only training trigger.
    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::TrainTrigger)
    }

    /// `true` for kinds that become a layer of the generated model.
    pub fn is_processing(&self) -> bool {
        !self.is_source() && !self.is_trigger()
    }

    /// `true` for layers that slide a window over height and width.
    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::Conv2d | Self::MaxPool2d | Self::AvgPool2d)
    }

    /// `true` for recurrent layers.
    pub fn is_recurrent(&self) -> bool {
        matches!(self, Self::Lstm | Self::Gru)
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LayerKind {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| crate::ConfigError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_loose() {
        assert_eq!(LayerKind::from_str_loose("conv2d"), Some(LayerKind::Conv2d));
        assert_eq!(LayerKind::from_str_loose("maxPooling2d"), Some(LayerKind::MaxPool2d));
        assert_eq!(LayerKind::from_str_loose("avg_pool2d"), Some(LayerKind::AvgPool2d));
        assert_eq!(LayerKind::from_str_loose("useData"), Some(LayerKind::DataCsv));
        assert_eq!(LayerKind::from_str_loose("mnist"), Some(LayerKind::DataMnist));
        assert_eq!(LayerKind::from_str_loose("batchNorm"), Some(LayerKind::BatchNorm));
        assert_eq!(LayerKind::from_str_loose("trainButton"), Some(LayerKind::TrainTrigger));
        assert_eq!(LayerKind::from_str_loose("bogus"), None);
    }

    #[test]
    fn test_canonical_tags_roundtrip() {
        for kind in LayerKind::ALL {
            assert_eq!(LayerKind::from_str_loose(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_serde_tags_match_as_str() {
        for kind in LayerKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        let legacy: LayerKind = serde_json::from_str("\"maxPooling2d\"").unwrap();
        assert_eq!(legacy, LayerKind::MaxPool2d);
    }

    #[test]
    fn test_classification() {
        assert!(LayerKind::DataMnist.is_source());
        assert!(!LayerKind::DataMnist.is_processing());
        assert!(LayerKind::TrainTrigger.is_trigger());
        assert!(!LayerKind::TrainTrigger.is_processing());
        assert!(LayerKind::Conv2d.is_spatial());
        assert!(LayerKind::AvgPool2d.is_spatial());
        assert!(!LayerKind::Dense.is_spatial());
        assert!(LayerKind::Gru.is_recurrent());
    }

    #[test]
    fn test_from_str_error() {
        let err = "nope".parse::<LayerKind>().unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
