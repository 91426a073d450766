use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::AnalysisResult;
use crate::enums::StageType;
use crate::ids::SessionId;

/// Results sharing one `session_id`, or a single result with no session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionGroup {
    pub session_id: Option<SessionId>,
    /// Newest `created_at` in the group; groups are listed by this, descending.
    pub latest_created_at: DateTime<Utc>,
    /// Members in stage order.
    pub results: Vec<AnalysisResult>,
}

impl SessionGroup {
    /// Build a group from its members. Returns `None` for an empty list.
    #[must_use]
    pub fn from_results(
        session_id: Option<SessionId>,
        mut results: Vec<AnalysisResult>,
    ) -> Option<Self> {
        let latest_created_at = results.iter().map(|r| r.created_at).max()?;
        results.sort_by(|a, b| {
            a.stage_type
                .cmp(&b.stage_type)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Some(Self {
            session_id,
            latest_created_at,
            results,
        })
    }

    /// The member for `stage`, if the group has one.
    #[must_use]
    pub fn stage(&self, stage: StageType) -> Option<&AnalysisResult> {
        self.results.iter().find(|r| r.stage_type == stage)
    }

    /// Stage types with no member in this group.
    #[must_use]
    pub fn missing_stages(&self) -> Vec<StageType> {
        StageType::ALL
            .into_iter()
            .filter(|stage| self.stage(*stage).is_none())
            .collect()
    }

    /// True when this is a session group holding every stage type.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session_id.is_some() && self.missing_stages().is_empty()
    }
}

/// Result listing for a class, flat or clustered by session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum ResultListing {
    /// Every result, newest first.
    Flat(Vec<AnalysisResult>),
    /// Session groups, newest group first.
    Grouped(Vec<SessionGroup>),
}

impl ResultListing {
    /// Number of results across the listing.
    #[must_use]
    pub fn result_count(&self) -> usize {
        match self {
            Self::Flat(results) => results.len(),
            Self::Grouped(groups) => groups.iter().map(|g| g.results.len()).sum(),
        }
    }
}
