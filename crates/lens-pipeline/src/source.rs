//! Class data source: loads the roster and context a stage payload is built from.

use std::future::Future;
use std::path::{Path, PathBuf};

use lens_core::entities::{ClassSnapshot, Student};
use serde::Deserialize;

use crate::error::ClassDataError;

/// Supplies current class data. The pipeline does not validate it further.
pub trait ClassDataSource: Send + Sync {
    fn load_class(
        &self,
        class_id: &str,
    ) -> impl Future<Output = Result<ClassSnapshot, ClassDataError>> + Send;
}

/// On-disk shape of a class file. `class_id` comes from the file name.
#[derive(Deserialize)]
struct ClassFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    students: Vec<Student>,
    #[serde(default)]
    context: serde_json::Value,
}

/// Reads `<dir>/<class_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, class_id: &str) -> Result<PathBuf, ClassDataError> {
        let valid = !class_id.is_empty()
            && class_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !class_id.starts_with('.');
        if !valid {
            return Err(ClassDataError::InvalidId(class_id.to_string()));
        }
        Ok(self.dir.join(format!("{class_id}.json")))
    }
}

impl ClassDataSource for JsonDirectorySource {
    async fn load_class(&self, class_id: &str) -> Result<ClassSnapshot, ClassDataError> {
        let path = self.path_for(class_id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClassDataError::NotFound(class_id.to_string()));
            }
            Err(source) => return Err(ClassDataError::Io { path, source }),
        };
        let file: ClassFile =
            serde_json::from_str(&raw).map_err(|source| ClassDataError::Parse {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(
            class_id,
            students = file.students.len(),
            path = %path.display(),
            "loaded class data"
        );
        Ok(ClassSnapshot {
            class_id: class_id.to_string(),
            name: file.name,
            students: file.students,
            context: file.context,
        })
    }
}
