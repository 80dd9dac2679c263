// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT


//! Subcommand implementations and shared setup.

pub mod check;
pub mod connect;
pub mod describe;
pub mod structure;

use anyhow::Context;
use editor::{EditorConfig, EditorSession};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the log subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads the editor configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("failed to load config from '{}'", path.display())),
        None => Ok(EditorConfig::default()),
    }
}

/// Opens a graph document as an editor session.
pub fn open_session(path: &Path, config: EditorConfig) -> anyhow::Result<EditorSession> {
    EditorSession::open(path, config)
        .with_context(|| format!("failed to load graph from '{}'", path.display()))
}

/// Prints the boxed command banner.
pub fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║{:^54}║", format!("netsketch · {title}"));
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}

/// Truncates a string to `max_len` characters with an ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
