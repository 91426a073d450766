use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Student;
use crate::enums::StageType;

/// Structured input sent to the analysis service for one stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StagePayload {
    pub class_id: String,
    pub class_name: String,
    pub stage: StageType,
    /// Student group number for `students-N` stages.
    pub group: Option<u8>,
    /// Students covered by this stage: the whole roster for `overview`,
    /// one partition for `students-N`.
    pub students: Vec<Student>,
    /// Size of the full roster the partition was cut from.
    pub roster_size: usize,
    pub context: serde_json::Value,
}
