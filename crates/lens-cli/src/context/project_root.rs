use std::path::{Path, PathBuf};

use lens_config::PROJECT_DIR;

/// Walk up from `start` to the first directory containing `.lens`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}
