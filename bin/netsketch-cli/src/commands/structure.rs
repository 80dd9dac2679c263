// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! `netsketch structure` command: print the layers that would be generated.

use super::{banner, open_session};
use anyhow::Context;
use editor::EditorConfig;
use std::path::PathBuf;

pub fn execute(graph: PathBuf, json: bool, config: EditorConfig) -> anyhow::Result<()> {
    let session = open_session(&graph, config)?;
    let structure = session
        .generate()
        .with_context(|| format!("'{}' cannot be generated", graph.display()))?;

    if json {
        println!("{}", structure.to_json()?);
        return Ok(());
    }

    banner("Model Structure");
    println!("  Model: {}", structure.name);
    println!("  Layers: {}", structure.len());
    println!();
    println!("  {:<4} {:<20} {:<12} {:>6}", "Idx", "Node", "Type", "Seq");
    println!("  {}", "-".repeat(46));
    for (index, layer) in structure.iter().enumerate() {
        let node = layer
            .node_id
            .as_ref()
            .map_or_else(|| "(inserted)".to_string(), |id| id.to_string());
        println!(
            "  {:<4} {:<20} {:<12} {:>6}",
            index,
            node,
            layer.kind.as_str(),
            layer.sequence_id.value(),
        );
    }
    println!();
    Ok(())
}
