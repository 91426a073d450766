//! Write-guard configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuardConfig {
    /// Class IDs whose analysis stages must not persist anything
    /// (demo and other read-only accounts).
    #[serde(default)]
    pub restricted_classes: Vec<String>,
}

impl GuardConfig {
    /// Check whether a class is on the restricted list.
    #[must_use]
    pub fn is_restricted(&self, class_id: &str) -> bool {
        self.restricted_classes.iter().any(|c| c == class_id)
    }
}
