use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use lens_analyzer::AnalyzerClient;
use lens_config::LensConfig;
use lens_db::service::LensService;
use lens_pipeline::{
    ClassLocks, JsonDirectorySource, ProgressBoard, RestrictedClassGuard, ResultResolver,
    SessionCoordinator, StageExecutor,
};

pub type LensExecutor<A = AnalyzerClient> = StageExecutor<LensService, A, JsonDirectorySource>;
pub type LensCoordinator<A = AnalyzerClient> =
    SessionCoordinator<LensService, A, JsonDirectorySource, RestrictedClassGuard>;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: LensConfig,
    pub store: Arc<LensService>,
    pub source: Arc<JsonDirectorySource>,
    pub guard: Arc<RestrictedClassGuard>,
    pub locks: ClassLocks,
    pub board: ProgressBoard,
    analyzer: Option<Arc<AnalyzerClient>>,
}

impl AppContext {
    /// Open the result database and wire the pipeline collaborators.
    ///
    /// The analyzer client is only built when `[analyzer]` is configured;
    /// read-only commands work without it.
    pub async fn init(project_root: PathBuf, config: LensConfig) -> anyhow::Result<Self> {
        let db_path = LensConfig::resolve_path(&project_root, &config.database.path);
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let store = LensService::new_local(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("failed to open result store at {}", db_path.display()))?;

        let analyzer = if config.analyzer.is_configured() {
            Some(Arc::new(
                AnalyzerClient::new(&config.analyzer)
                    .context("failed to build analyzer client")?,
            ))
        } else {
            None
        };

        let classes_dir = LensConfig::resolve_path(&project_root, &config.classes.dir);
        tracing::debug!(
            root = %project_root.display(),
            db = %db_path.display(),
            classes = %classes_dir.display(),
            analyzer = analyzer.is_some(),
            "application context ready"
        );

        Ok(Self {
            source: Arc::new(JsonDirectorySource::new(classes_dir)),
            guard: Arc::new(RestrictedClassGuard::from_config(&config.guard)),
            store: Arc::new(store),
            locks: ClassLocks::new(),
            board: ProgressBoard::new(),
            analyzer,
            config,
        })
    }

    #[must_use]
    pub fn resolver(&self) -> ResultResolver<LensService> {
        ResultResolver::new(Arc::clone(&self.store))
    }

    #[must_use]
    pub fn analyzer(&self) -> Option<Arc<AnalyzerClient>> {
        self.analyzer.clone()
    }

    /// Stage executor backed by the configured analyzer.
    pub fn executor(&self) -> anyhow::Result<LensExecutor> {
        let analyzer = self.analyzer.clone().context(
            "analyzer is not configured; set analyzer.endpoint in .lens/config.toml or LENS_ANALYZER__ENDPOINT",
        )?;
        Ok(StageExecutor::new(
            Arc::clone(&self.store),
            analyzer,
            Arc::clone(&self.source),
        ))
    }

    /// Session coordinator sharing this context's run locks.
    pub fn coordinator(&self) -> anyhow::Result<LensCoordinator> {
        Ok(SessionCoordinator::new(
            self.executor()?,
            Arc::clone(&self.guard),
            self.locks.clone(),
        ))
    }
}
