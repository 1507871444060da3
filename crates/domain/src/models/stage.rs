//! Lifecycle stage of a maintenance request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a maintenance request.
///
/// Variants are declared in board column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(alias = "new")]
    New,
    #[serde(rename = "In Progress", alias = "InProgress", alias = "in_progress")]
    InProgress,
    #[serde(alias = "repaired")]
    Repaired,
    #[serde(alias = "scrap")]
    Scrap,
}

impl Stage {
    /// All stages in board column order.
    pub const ALL: [Stage; 4] = [Stage::New, Stage::InProgress, Stage::Repaired, Stage::Scrap];

    /// Returns the display and storage label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::New => "New",
            Stage::InProgress => "In Progress",
            Stage::Repaired => "Repaired",
            Stage::Scrap => "Scrap",
        }
    }

    /// Zero-based board column index.
    pub fn index(&self) -> usize {
        match self {
            Stage::New => 0,
            Stage::InProgress => 1,
            Stage::Repaired => 2,
            Stage::Scrap => 3,
        }
    }

    /// Stages where normal work has ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Stage::Repaired | Stage::Scrap)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "New" | "new" => Ok(Stage::New),
            "In Progress" | "InProgress" | "in_progress" => Ok(Stage::InProgress),
            "Repaired" | "repaired" => Ok(Stage::Repaired),
            "Scrap" | "scrap" => Ok(Stage::Scrap),
            other => Err(format!(
                "Invalid stage: {}. Must be one of: New, In Progress, Repaired, Scrap",
                other
            )),
        }
    }
}
