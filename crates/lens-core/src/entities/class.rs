use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A student on a class roster.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Free-form per-student data (survey answers, relationships, notes).
    #[serde(default)]
    pub attributes: serde_json::Value,
}

/// The class data a stage payload is built from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClassSnapshot {
    pub class_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
    /// Class-wide data (survey questions, sociogram edges) passed to every stage.
    #[serde(default)]
    pub context: serde_json::Value,
}

impl ClassSnapshot {
    /// The roster ordered by student ID.
    ///
    /// Group partitioning slices this list, so it must not depend on the order
    /// the source returned students in.
    #[must_use]
    pub fn ordered_students(&self) -> Vec<Student> {
        let mut students = self.students.clone();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        students
    }
}
