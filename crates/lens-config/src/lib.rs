//! # lens-config
//!
//! Layered configuration loading for Classlens using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LENS_*` prefix, `__` as separator)
//! 2. Project-level `.lens/config.toml`
//! 3. User-level `~/.config/lens/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LENS_ANALYZER__ENDPOINT` -> `analyzer.endpoint`,
//! `LENS_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use lens_config::LensConfig;
//!
//! let config = LensConfig::load_for_project(Path::new(".")).expect("config");
//! if config.analyzer.is_configured() {
//!     println!("Analyzer: {}", config.analyzer.endpoint);
//! }
//! ```

mod analyzer;
mod error;
mod general;
mod guard;
mod storage;

pub use analyzer::AnalyzerConfig;
pub use error::ConfigError;
pub use general::{GeneralConfig, ServerConfig};
pub use guard::GuardConfig;
pub use storage::{ClassesConfig, DatabaseConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding per-project Classlens state.
pub const PROJECT_DIR: &str = ".lens";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LensConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub classes: ClassesConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl LensConfig {
    /// Load configuration for an explicit project root.
    ///
    /// Reads `<root>/.env` (if present) before building the figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed.
    pub fn load_for_project(root: &Path) -> Result<Self, ConfigError> {
        let env_path = root.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }
        Self::figment_for(root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain for a project root.
    ///
    /// Public so tests can inspect the figment directly or add providers.
    #[must_use]
    pub fn figment_for(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("LENS_").split("__"))
    }

    /// Resolve a configured path against the project root.
    ///
    /// Absolute paths and `:memory:` are returned unchanged.
    #[must_use]
    pub fn resolve_path(root: &Path, configured: &str) -> PathBuf {
        let path = PathBuf::from(configured);
        if configured == ":memory:" || path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lens").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = LensConfig::default();
        assert!(!config.analyzer.is_configured());
        assert!(config.guard.restricted_classes.is_empty());
        assert_eq!(config.database.path, ".lens/lens.db");
        assert_eq!(config.classes.dir, ".lens/classes");
    }

    #[test]
    fn figment_builds_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config: LensConfig = LensConfig::figment_for(dir.path())
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.general.default_limit, 20);
        assert_eq!(config.analyzer.timeout_secs, 300);
    }

    #[test]
    fn resolve_path_keeps_memory_and_absolute() {
        let root = Path::new("/srv/project");
        assert_eq!(
            LensConfig::resolve_path(root, ":memory:"),
            PathBuf::from(":memory:")
        );
        assert_eq!(
            LensConfig::resolve_path(root, "/var/lens.db"),
            PathBuf::from("/var/lens.db")
        );
        assert_eq!(
            LensConfig::resolve_path(root, ".lens/lens.db"),
            PathBuf::from("/srv/project/.lens/lens.db")
        );
    }
}
