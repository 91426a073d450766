//! Storage locations: the result database and the roster directory.

use serde::{Deserialize, Serialize};

fn default_database_path() -> String {
    ".lens/lens.db".to_string()
}

fn default_classes_dir() -> String {
    ".lens/classes".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassesConfig {
    /// Directory holding one `<class_id>.json` roster file per class.
    #[serde(default = "default_classes_dir")]
    pub dir: String,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        Self {
            dir: default_classes_dir(),
        }
    }
}
