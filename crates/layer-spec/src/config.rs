// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed per-kind layer configuration.
//!
//! Canvas forms hand us loose JSON objects using the TensorFlow.js option
//! names (`kernelSize`, `returnSequences`, ...). [`LayerConfig::from_value`]
//! turns such an object into the record for one kind, filling defaults
//! and keeping unrecognised keys in an opaque `extra` map that is passed
//! through to generated code untouched. [`LayerConfig::validate`] then
//! range-checks the recognised fields.

use crate::{ConfigError, LayerKind, Padding, TargetShape, Window};
use std::collections::BTreeMap;

/// Unrecognised options, forwarded verbatim.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Options for the CSV data source.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvSourceConfig {
    /// Rows per sample window.
    pub time_steps: usize,
    /// Numeric columns per row; unknown until the file is inspected.
    pub features: Option<usize>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            time_steps: 1,
            features: None,
            extra: Extra::new(),
        }
    }
}

/// Options-free kinds (MNIST source, flatten, train trigger).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EmptyConfig {
    #[serde(flatten)]
    pub extra: Extra,
}

/// Options for a 2D convolution.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conv2dConfig {
    pub kernel_size: Window,
    pub filters: usize,
    pub strides: Window,
    pub padding: Padding,
    pub activation: String,
    pub kernel_initializer: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Conv2dConfig {
    fn default() -> Self {
        Self {
            kernel_size: Window::square(5),
            filters: 8,
            strides: Window::square(1),
            padding: Padding::Valid,
            activation: "relu".to_string(),
            kernel_initializer: "varianceScaling".to_string(),
            extra: Extra::new(),
        }
    }
}

/// Options for max and average pooling.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pool2dConfig {
    pub pool_size: Window,
    /// Defaults to the pool size when absent.
    pub strides: Option<Window>,
    pub padding: Padding,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Pool2dConfig {
    /// The stride actually applied.
    pub fn effective_strides(&self) -> Window {
        self.strides.unwrap_or(self.pool_size)
    }
}

impl Default for Pool2dConfig {
    fn default() -> Self {
        Self {
            pool_size: Window::square(2),
            strides: None,
            padding: Padding::Valid,
            extra: Extra::new(),
        }
    }
}

/// Options for a fully connected layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DenseConfig {
    pub units: usize,
    pub activation: String,
    pub kernel_initializer: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for DenseConfig {
    fn default() -> Self {
        Self {
            units: 10,
            activation: "softmax".to_string(),
            kernel_initializer: "varianceScaling".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropoutConfig {
    pub rate: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for DropoutConfig {
    fn default() -> Self {
        Self {
            rate: 0.2,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchNormConfig {
    pub axis: i64,
    pub momentum: f64,
    pub epsilon: f64,
    pub center: bool,
    pub scale: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for BatchNormConfig {
    fn default() -> Self {
        Self {
            axis: -1,
            momentum: 0.99,
            epsilon: 0.001,
            center: true,
            scale: true,
            extra: Extra::new(),
        }
    }
}

/// Options shared by LSTM and GRU layers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrentConfig {
    pub units: usize,
    pub activation: String,
    pub recurrent_activation: String,
    /// Emit one output per time step instead of only the last.
    pub return_sequences: bool,
    pub dropout: f64,
    pub recurrent_dropout: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for RecurrentConfig {
    fn default() -> Self {
        Self {
            units: 128,
            activation: "tanh".to_string(),
            recurrent_activation: "sigmoid".to_string(),
            return_sequences: false,
            dropout: 0.0,
            recurrent_dropout: 0.0,
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivationConfig {
    pub activation: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            activation: "relu".to_string(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReshapeConfig {
    pub target_shape: TargetShape,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The configuration record of one node, tagged by kind.
///
/// Serializes as the bare inner record; the kind travels separately
/// (on the node, or next to the config in generated structures).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum LayerConfig {
    DataCsv(CsvSourceConfig),
    DataMnist(EmptyConfig),
    Conv2d(Conv2dConfig),
    MaxPool2d(Pool2dConfig),
    AvgPool2d(Pool2dConfig),
    Dense(DenseConfig),
    Dropout(DropoutConfig),
    BatchNorm(BatchNormConfig),
    Flatten(EmptyConfig),
    Lstm(RecurrentConfig),
    Gru(RecurrentConfig),
    Activation(ActivationConfig),
    Reshape(ReshapeConfig),
    TrainTrigger(EmptyConfig),
}

impl LayerConfig {
    /// The default configuration for a kind, as the canvas creates it.
    pub fn default_for(kind: LayerKind) -> Self {
        match kind {
            LayerKind::DataCsv => Self::DataCsv(CsvSourceConfig::default()),
            LayerKind::DataMnist => Self::DataMnist(EmptyConfig::default()),
            LayerKind::Conv2d => Self::Conv2d(Conv2dConfig::default()),
            LayerKind::MaxPool2d => Self::MaxPool2d(Pool2dConfig::default()),
            LayerKind::AvgPool2d => Self::AvgPool2d(Pool2dConfig::default()),
            LayerKind::Dense => Self::Dense(DenseConfig::default()),
            LayerKind::Dropout => Self::Dropout(DropoutConfig::default()),
            LayerKind::BatchNorm => Self::BatchNorm(BatchNormConfig::default()),
            LayerKind::Flatten => Self::Flatten(EmptyConfig::default()),
            LayerKind::Lstm => Self::Lstm(RecurrentConfig::default()),
            LayerKind::Gru => Self::Gru(RecurrentConfig::default()),
            LayerKind::Activation => Self::Activation(ActivationConfig::default()),
            LayerKind::Reshape => Self::Reshape(ReshapeConfig::default()),
            LayerKind::TrainTrigger => Self::TrainTrigger(EmptyConfig::default()),
        }
    }

    /// Parses a loose JSON options object into the record for `kind`.
    ///
    /// `null` yields the default record. The result is validated.
    pub fn from_value(kind: LayerKind, value: serde_json::Value) -> Result<Self, ConfigError> {
        if value.is_null() {
            return Ok(Self::default_for(kind));
        }

        fn parse<T: serde::de::DeserializeOwned>(
            kind: LayerKind,
            value: serde_json::Value,
        ) -> Result<T, ConfigError> {
            serde_json::from_value(value).map_err(|source| ConfigError::Malformed { kind, source })
        }

        let config = match kind {
            LayerKind::DataCsv => Self::DataCsv(parse(kind, value)?),
            LayerKind::DataMnist => Self::DataMnist(parse(kind, value)?),
            LayerKind::Conv2d => Self::Conv2d(parse(kind, value)?),
            LayerKind::MaxPool2d => Self::MaxPool2d(parse(kind, value)?),
            LayerKind::AvgPool2d => Self::AvgPool2d(parse(kind, value)?),
            LayerKind::Dense => Self::Dense(parse(kind, value)?),
            LayerKind::Dropout => Self::Dropout(parse(kind, value)?),
            LayerKind::BatchNorm => Self::BatchNorm(parse(kind, value)?),
            LayerKind::Flatten => Self::Flatten(parse(kind, value)?),
            LayerKind::Lstm => Self::Lstm(parse(kind, value)?),
            LayerKind::Gru => Self::Gru(parse(kind, value)?),
            LayerKind::Activation => Self::Activation(parse(kind, value)?),
            LayerKind::Reshape => Self::Reshape(parse(kind, value)?),
            LayerKind::TrainTrigger => Self::TrainTrigger(parse(kind, value)?),
        };
        config.validate()?;
        Ok(config)
    }

    /// The kind this record configures.
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::DataCsv(_) => LayerKind::DataCsv,
            Self::DataMnist(_) => LayerKind::DataMnist,
            Self::Conv2d(_) => LayerKind::Conv2d,
            Self::MaxPool2d(_) => LayerKind::MaxPool2d,
            Self::AvgPool2d(_) => LayerKind::AvgPool2d,
            Self::Dense(_) => LayerKind::Dense,
            Self::Dropout(_) => LayerKind::Dropout,
            Self::BatchNorm(_) => LayerKind::BatchNorm,
            Self::Flatten(_) => LayerKind::Flatten,
            Self::Lstm(_) => LayerKind::Lstm,
            Self::Gru(_) => LayerKind::Gru,
            Self::Activation(_) => LayerKind::Activation,
            Self::Reshape(_) => LayerKind::Reshape,
            Self::TrainTrigger(_) => LayerKind::TrainTrigger,
        }
    }

    /// Checks that this record configures `expected`.
    pub fn ensure_kind(&self, expected: LayerKind) -> Result<(), ConfigError> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(ConfigError::KindMismatch { expected, found })
        }
    }

    /// Range-checks the recognised options.
    ///
    /// # Checks
    /// - Filter, unit, kernel, pool and stride extents are non-zero.
    /// - CSV windows have at least one time step and, if known, one feature.
    /// - Dropout rates lie in `[0, 1)`.
    /// - Reshape targets name at least one axis and no zero-extent axis.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let kind = self.kind();
        let invalid = |field: &'static str, detail: String| ConfigError::InvalidValue {
            kind,
            field,
            detail,
        };

        match self {
            Self::DataCsv(c) => {
                if c.time_steps == 0 {
                    return Err(invalid("timeSteps", "must be at least 1".into()));
                }
                if c.features == Some(0) {
                    return Err(invalid("features", "must be at least 1".into()));
                }
            }
            Self::Conv2d(c) => {
                if c.filters == 0 {
                    return Err(invalid("filters", "must be at least 1".into()));
                }
                if c.kernel_size.is_degenerate() {
                    return Err(invalid("kernelSize", format!("{} has a zero extent", c.kernel_size)));
                }
                if c.strides.is_degenerate() {
                    return Err(invalid("strides", format!("{} has a zero extent", c.strides)));
                }
            }
            Self::MaxPool2d(c) | Self::AvgPool2d(c) => {
                if c.pool_size.is_degenerate() {
                    return Err(invalid("poolSize", format!("{} has a zero extent", c.pool_size)));
                }
                if c.effective_strides().is_degenerate() {
                    return Err(invalid(
                        "strides",
                        format!("{} has a zero extent", c.effective_strides()),
                    ));
                }
            }
            Self::Dense(c) => {
                if c.units == 0 {
                    return Err(invalid("units", "must be at least 1".into()));
                }
            }
            Self::Dropout(c) => check_rate(kind, "rate", c.rate)?,
            Self::Lstm(c) | Self::Gru(c) => {
                if c.units == 0 {
                    return Err(invalid("units", "must be at least 1".into()));
                }
                check_rate(kind, "dropout", c.dropout)?;
                check_rate(kind, "recurrentDropout", c.recurrent_dropout)?;
            }
            Self::BatchNorm(c) => {
                if c.epsilon.is_nan() || c.epsilon <= 0.0 {
                    return Err(invalid("epsilon", format!("{} must be positive", c.epsilon)));
                }
            }
            Self::Reshape(c) => {
                if c.target_shape.is_empty() {
                    return Err(invalid("targetShape", "names no axes".into()));
                }
                if c.target_shape.dims().contains(&Some(0)) {
                    return Err(invalid(
                        "targetShape",
                        format!("{} has a zero-extent axis", c.target_shape),
                    ));
                }
            }
            Self::DataMnist(_) | Self::Flatten(_) | Self::Activation(_) | Self::TrainTrigger(_) => {}
        }
        Ok(())
    }

    /// Unrecognised options carried by this record.
    pub fn extra(&self) -> &Extra {
        match self {
            Self::DataCsv(c) => &c.extra,
            Self::DataMnist(c) | Self::Flatten(c) | Self::TrainTrigger(c) => &c.extra,
            Self::Conv2d(c) => &c.extra,
            Self::MaxPool2d(c) | Self::AvgPool2d(c) => &c.extra,
            Self::Dense(c) => &c.extra,
            Self::Dropout(c) => &c.extra,
            Self::BatchNorm(c) => &c.extra,
            Self::Lstm(c) | Self::Gru(c) => &c.extra,
            Self::Activation(c) => &c.extra,
            Self::Reshape(c) => &c.extra,
        }
    }

    /// Serializes the record back to a JSON options object.
    pub fn to_value(&self) -> serde_json::Value {
        // Every record is a plain struct of JSON-compatible fields.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn check_rate(kind: LayerKind, field: &'static str, rate: f64) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&rate) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            kind,
            field,
            detail: format!("{rate} is outside [0, 1)"),
        })
    }
}
