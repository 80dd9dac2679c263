// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

/// How a reshape is judged when element counts cannot be compared.
///
/// An axis that is unknown on either side makes the element count
/// unknown. `Permissive` accepts such a reshape because it cannot be
/// disproved; `Strict` rejects it because it cannot be proved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReshapePolicy {
    #[default]
    Permissive,
    Strict,
}

impl fmt::Display for ReshapePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permissive => f.write_str("permissive"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

impl FromStr for ReshapePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown reshape policy '{other}'")),
        }
    }
}
