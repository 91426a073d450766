use std::path::Path;

use anyhow::Context;
use lens_config::LensConfig;

/// Load the layered config for `project_root`.
///
/// `<root>/.env` is read when present; otherwise the usual dotenv search from
/// the current directory applies.
pub fn load_config(project_root: &Path) -> anyhow::Result<LensConfig> {
    if !project_root.join(".env").exists() {
        let _ = dotenvy::dotenv();
    }
    LensConfig::load_for_project(project_root).context("failed to load classlens configuration")
}
