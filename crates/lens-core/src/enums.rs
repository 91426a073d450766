//! Stage types and run status enums for Classlens.
//!
//! `StageType` is a closed set: one class overview plus eight student groups.
//! The order of [`StageType::ALL`] is the order in which a session runs them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// StageType
// ---------------------------------------------------------------------------

/// Number of student-group stages in a session.
pub const STUDENT_GROUP_COUNT: u8 = 8;

/// One discrete analysis unit.
///
/// ```text
/// overview → students-1 → students-2 → … → students-8
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum StageType {
    #[serde(rename = "overview")]
    Overview,
    #[serde(rename = "students-1")]
    Students1,
    #[serde(rename = "students-2")]
    Students2,
    #[serde(rename = "students-3")]
    Students3,
    #[serde(rename = "students-4")]
    Students4,
    #[serde(rename = "students-5")]
    Students5,
    #[serde(rename = "students-6")]
    Students6,
    #[serde(rename = "students-7")]
    Students7,
    #[serde(rename = "students-8")]
    Students8,
}

impl StageType {
    /// Every stage, in execution order.
    pub const ALL: [Self; 9] = [
        Self::Overview,
        Self::Students1,
        Self::Students2,
        Self::Students3,
        Self::Students4,
        Self::Students5,
        Self::Students6,
        Self::Students7,
        Self::Students8,
    ];

    /// Return the string representation used in SQL storage and URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Students1 => "students-1",
            Self::Students2 => "students-2",
            Self::Students3 => "students-3",
            Self::Students4 => "students-4",
            Self::Students5 => "students-5",
            Self::Students6 => "students-6",
            Self::Students7 => "students-7",
            Self::Students8 => "students-8",
        }
    }

    /// Student group number (1-based) for `students-N` stages.
    #[must_use]
    pub const fn group(self) -> Option<u8> {
        match self {
            Self::Overview => None,
            Self::Students1 => Some(1),
            Self::Students2 => Some(2),
            Self::Students3 => Some(3),
            Self::Students4 => Some(4),
            Self::Students5 => Some(5),
            Self::Students6 => Some(6),
            Self::Students7 => Some(7),
            Self::Students8 => Some(8),
        }
    }

    /// The `students-N` stage for a 1-based group number.
    #[must_use]
    pub const fn from_group(group: u8) -> Option<Self> {
        match group {
            1 => Some(Self::Students1),
            2 => Some(Self::Students2),
            3 => Some(Self::Students3),
            4 => Some(Self::Students4),
            5 => Some(Self::Students5),
            6 => Some(Self::Students6),
            7 => Some(Self::Students7),
            8 => Some(Self::Students8),
            _ => None,
        }
    }

    /// Zero-based position in [`StageType::ALL`].
    #[must_use]
    pub const fn position(self) -> usize {
        match self.group() {
            Some(group) => group as usize,
            None => 0,
        }
    }

    /// Human-readable progress label.
    #[must_use]
    pub fn label(self) -> String {
        match self.group() {
            None => "Analyzing class overview".to_string(),
            Some(group) => format!("Analyzing student group {group} of {STUDENT_GROUP_COUNT}"),
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageType {
    type Err = CoreError;

    /// Accepts `overview`, `students-N`, and the `students_N` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        if normalized == "overview" {
            return Ok(Self::Overview);
        }
        normalized
            .strip_prefix("students-")
            .and_then(|n| n.parse::<u8>().ok())
            .and_then(Self::from_group)
            .ok_or_else(|| CoreError::UnknownStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// RunStatus
// ---------------------------------------------------------------------------

/// Final status of one coordinator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every stage ran (persisted or skipped by the write guard).
    Completed,
    /// A stage failed; remaining stages were not started.
    Failed,
    /// The caller went away; remaining stages were not started.
    Cancelled,
}

impl RunStatus {
    /// Return the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
