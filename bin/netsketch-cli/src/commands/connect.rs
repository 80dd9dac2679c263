// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! `netsketch connect` command: dry-run a connection between two nodes.

use super::open_session;
use editor::EditorConfig;
use model_graph::NodeId;
use shape_inference::Remediation;
use std::path::PathBuf;

pub fn execute(
    graph: PathBuf,
    source: String,
    target: String,
    config: EditorConfig,
) -> anyhow::Result<()> {
    let session = open_session(&graph, config)?;
    let (source, target) = (NodeId::new(source), NodeId::new(target));

    match session.check_connection(&source, &target) {
        Ok(connection) => {
            println!(
                "ok: {source} ({}) -> {target} ({})",
                connection.source_output, connection.target_output
            );
            Ok(())
        }
        Err(err) => {
            println!("rejected: {err}");
            if let Some(Remediation::InsertFlatten) =
                err.connection_error().and_then(|e| e.remediation())
            {
                println!("remediation: insert a flatten layer between {source} and {target}");
                if session.config().auto_insert_flatten {
                    println!("  (the editor does this automatically)");
                }
            }
            anyhow::bail!("connection {source} -> {target} is not valid")
        }
    }
}
