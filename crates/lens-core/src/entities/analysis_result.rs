use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StageType;
use crate::ids::SessionId;

/// One completed stage execution.
///
/// `result_data` is the analyzer's raw output and is never parsed by the
/// pipeline. `summary` is a user annotation that can change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnalysisResult {
    pub id: String,
    pub class_id: String,
    pub session_id: Option<SessionId>,
    pub stage_type: StageType,
    pub result_data: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input to a store upsert. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewAnalysisResult {
    pub class_id: String,
    pub stage_type: StageType,
    pub session_id: Option<SessionId>,
    pub result_data: String,
    pub summary: Option<String>,
}

impl NewAnalysisResult {
    #[must_use]
    pub fn new(
        class_id: impl Into<String>,
        stage_type: StageType,
        session_id: Option<SessionId>,
        result_data: impl Into<String>,
    ) -> Self {
        Self {
            class_id: class_id.into(),
            stage_type,
            session_id,
            result_data: result_data.into(),
            summary: None,
        }
    }
}
