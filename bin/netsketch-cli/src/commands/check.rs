// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! `netsketch check` command: propagate shapes and print every node.

use super::{banner, open_session, truncate};
use editor::EditorConfig;
use shape_inference::NodeShape;
use std::path::PathBuf;

pub fn execute(graph: PathBuf, config: EditorConfig) -> anyhow::Result<()> {
    banner("Shape Check");
    let session = open_session(&graph, config)?;
    let shapes = session.shapes();

    println!("  Graph: {}", session.graph().summary());
    println!("  Reshape policy: {}", session.config().reshape_policy);
    println!();

    // ── Per-Node Shapes ────────────────────────────────────────
    println!(
        "  {:<20} {:<12} {:>6}  {:<24} {}",
        "Node", "Type", "Seq", "Input", "Output",
    );
    println!("  {}", "-".repeat(90));

    let mut nodes: Vec<_> = session.graph().nodes().iter().collect();
    nodes.sort_by_key(|n| n.sequence_id);
    for node in nodes {
        let (input, output) = match shapes.get(&node.id) {
            Some(NodeShape::Resolved { input, output }) => (
                input.as_ref().map_or_else(|| "-".to_string(), |s| s.to_string()),
                output.to_string(),
            ),
            Some(NodeShape::Failed { error, input }) => (
                input.as_ref().map_or_else(|| "-".to_string(), |s| s.to_string()),
                format!("error: {error}"),
            ),
            None => ("-".to_string(), "unreached".to_string()),
        };
        println!(
            "  {:<20} {:<12} {:>6}  {:<24} {}",
            truncate(node.id.as_str(), 20),
            node.kind.as_str(),
            node.sequence_id.value(),
            truncate(&input, 24),
            output,
        );
    }
    println!();

    for issue in shapes.issues() {
        println!("  Graph issue: {issue}");
    }

    let failures = shapes.errors().len() + shapes.issues().len();
    if failures > 0 {
        anyhow::bail!("shape check failed with {failures} problem(s)");
    }
    println!("  All shapes resolved.");
    Ok(())
}
