// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-builder
//!
//! Turns the canvas graph into the ordered layer list a code generator
//! renders.
//!
//! - [`extract_model_structure`]: breadth-first inclusion from the entry
//!   nodes, then ordering by sequence id.
//! - [`ModelStructure::with_implicit_flattens`]: inserts the flatten a
//!   dense layer needs after a spatial one.
//! - [`prepare_for_generation`]: the all-or-nothing gate in front of code
//!   generation: structure checks, shape propagation, extraction.

mod error;
mod extract;
mod generate;
mod structure;

pub use error::BuildError;
pub use extract::extract_model_structure;
pub use generate::prepare_for_generation;
pub use structure::{ModelLayer, ModelStructure};
