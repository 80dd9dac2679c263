// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! # netsketch
//!
//! Command-line tools for neural network graph documents.
//!
//! ## Usage
//! ```bash
//! # Propagate shapes and print a per-node table
//! netsketch check --graph ./mnist-cnn.json
//!
//! # Print the ordered layer list that would be generated
//! netsketch structure --graph ./mnist-cnn.json --json
//!
//! # Describe a single layer for a given input
//! netsketch describe --layer conv2d --input "(None, 28, 28, 1)" --params '{"filters": 16}'
//!
//! # Dry-run a connection between two nodes
//! netsketch connect --graph ./mnist-cnn.json --source conv2d-2 --target dense-3
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "netsketch",
    about = "Shape checking and model linearization for neural network graphs",
    version,
    author
)]
struct Cli {
    /// Path to an editor configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Propagate shapes through a graph and report every node.
    Check {
        /// Path to the graph document (JSON).
        #[arg(short, long)]
        graph: std::path::PathBuf,
    },

    /// Run the generation checks and print the ordered layers.
    Structure {
        /// Path to the graph document (JSON).
        #[arg(short, long)]
        graph: std::path::PathBuf,

        /// Print the structure as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Describe what a layer does to an input shape.
    Describe {
        /// Layer type (e.g. "conv2d", "dense", "flatten").
        #[arg(short, long)]
        layer: String,

        /// Input shape including the batch axis, e.g. "(None, 28, 28, 1)".
        #[arg(short, long)]
        input: Option<String>,

        /// Layer parameters as a JSON object.
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Check whether two nodes of a graph can be connected.
    Connect {
        /// Path to the graph document (JSON).
        #[arg(short, long)]
        graph: std::path::PathBuf,

        /// Id of the source node.
        #[arg(short, long)]
        source: String,

        /// Id of the target node.
        #[arg(short, long)]
        target: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;
    tracing::debug!("editor configuration: {:?}", config);

    match cli.command {
        Commands::Check { graph } => commands::check::execute(graph, config),
        Commands::Structure { graph, json } => commands::structure::execute(graph, json, config),
        Commands::Describe {
            layer,
            input,
            params,
        } => commands::describe::execute(layer, input, params),
        Commands::Connect {
            graph,
            source,
            target,
        } => commands::connect::execute(graph, source, target, config),
    }
}
