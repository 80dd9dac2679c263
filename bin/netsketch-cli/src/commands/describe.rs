// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! `netsketch describe` command: explain a single layer's shape effect.

use anyhow::Context;
use layer_spec::{compute_output_shape, LayerConfig, LayerKind};
use shape_inference::layer_shape_description;
use tensor_shape::Shape;

pub fn execute(layer: String, input: Option<String>, params: Option<String>) -> anyhow::Result<()> {
    let kind = LayerKind::from_str_loose(&layer)
        .ok_or_else(|| anyhow::anyhow!("unknown layer type '{layer}'"))?;

    let config = match params {
        Some(json) => {
            let value: serde_json::Value =
                serde_json::from_str(&json).context("layer parameters are not valid JSON")?;
            LayerConfig::from_value(kind, value)?
        }
        None => LayerConfig::default_for(kind),
    };
    config.validate()?;

    let input: Option<Shape> = input
        .map(|text| {
            text.parse()
                .with_context(|| format!("invalid input shape '{text}'"))
        })
        .transpose()?;

    println!("{}", layer_shape_description(&config, input.as_ref()));
    if let Some(output) = compute_output_shape(&config, input.as_ref()) {
        println!("output: {output}");
    }
    Ok(())
}
