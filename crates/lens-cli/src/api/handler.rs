use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use serde_json::{Value, json};
use tiny_http::Method;
use tokio_util::sync::CancellationToken;

use lens_analyzer::AnalyzerClient;
use lens_core::entities::AnalysisResult;
use lens_core::enums::StageType;
use lens_core::ids::SessionId;
use lens_db::error::DatabaseError;
use lens_db::service::LensService;
use lens_pipeline::{
    AnalysisService, ClassDataError, ClassLocks, GuardDecision, JsonDirectorySource,
    ProgressBoard, ProgressReporter, RestrictedClassGuard, ResultResolver, RunError,
    SessionCoordinator, StageError, StageExecutor, WriteGuard,
};

use super::ApiResponse;
use super::route::{self, Route};
use crate::context::AppContext;

type Reply = Result<ApiResponse, ApiResponse>;

#[derive(Debug, Serialize)]
struct DeleteResponse {
    deleted: u64,
}

impl From<DatabaseError> for ApiResponse {
    fn from(error: DatabaseError) -> Self {
        tracing::error!(%error, "result store failed");
        Self::error(500, error.to_string())
    }
}

const fn stage_error_status(error: &StageError) -> u16 {
    match error {
        StageError::Service(_) => 502,
        StageError::Store(_) => 500,
        StageError::ClassData(ClassDataError::NotFound(_)) => 404,
        StageError::ClassData(ClassDataError::InvalidId(_)) => 400,
        StageError::ClassData(_) => 500,
    }
}

impl From<StageError> for ApiResponse {
    fn from(error: StageError) -> Self {
        let status = stage_error_status(&error);
        if status >= 500 {
            tracing::error!(%error, "stage failed");
        }
        Self::error(status, error.to_string())
    }
}

impl From<RunError> for ApiResponse {
    fn from(error: RunError) -> Self {
        match error {
            RunError::AlreadyRunning { .. } => Self::error(409, error.to_string()),
            RunError::StageFailed {
                session_id,
                stage,
                report,
                source,
            } => {
                let status = stage_error_status(&source);
                tracing::error!(%session_id, %stage, error = %source, "run aborted");
                Self {
                    status,
                    body: json!({
                        "error": format!("stage {stage} failed: {source}"),
                        "stage": stage,
                        "report": serde_json::to_value(&*report).unwrap_or(Value::Null),
                    }),
                }
            }
            RunError::Core(_) => Self::error(500, error.to_string()),
        }
    }
}

/// Cancellation tokens of the runs started over HTTP, by class.
type RunTokens = DashMap<String, CancellationToken>;

/// Removes a run's token when the run ends, however it ends.
struct RunRegistration<'a> {
    runs: &'a RunTokens,
    class_id: String,
}

impl Drop for RunRegistration<'_> {
    fn drop(&mut self) {
        self.runs.remove(&self.class_id);
    }
}

/// Executes routes against the store and pipeline.
///
/// Generic over the analysis service so the surface can be driven without a
/// live analyzer. A run started over HTTP is not tied to its connection; it
/// stops early only on server shutdown or `DELETE …/analysis/run`.
pub struct Api<A = AnalyzerClient> {
    store: Arc<LensService>,
    source: Arc<JsonDirectorySource>,
    guard: Arc<RestrictedClassGuard>,
    locks: ClassLocks,
    board: ProgressBoard,
    runs: RunTokens,
    analyzer: Option<Arc<A>>,
    shutdown: CancellationToken,
}

impl Api<AnalyzerClient> {
    pub fn from_context(ctx: &AppContext, shutdown: CancellationToken) -> Self {
        Self {
            store: Arc::clone(&ctx.store),
            source: Arc::clone(&ctx.source),
            guard: Arc::clone(&ctx.guard),
            locks: ctx.locks.clone(),
            board: ctx.board.clone(),
            runs: DashMap::new(),
            analyzer: ctx.analyzer(),
            shutdown,
        }
    }
}

impl<A: AnalysisService> Api<A> {
    pub fn new(
        store: Arc<LensService>,
        source: Arc<JsonDirectorySource>,
        guard: Arc<RestrictedClassGuard>,
        analyzer: Option<Arc<A>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            source,
            guard,
            locks: ClassLocks::new(),
            board: ProgressBoard::new(),
            runs: DashMap::new(),
            analyzer,
            shutdown,
        }
    }

    /// Route and execute one request.
    pub async fn handle(&self, method: &Method, url: &str, body: &str) -> ApiResponse {
        let route = match route::parse(method, url) {
            Ok(route) => route,
            Err(e) => return ApiResponse::error(e.status(), e.message()),
        };
        tracing::debug!(?route, "handling request");
        match self.dispatch(route, body).await {
            Ok(response) | Err(response) => response,
        }
    }

    async fn dispatch(&self, route: Route, body: &str) -> Reply {
        match route {
            Route::LegacyRun { class_id } => {
                self.run_stage(&class_id, StageType::Overview, None).await
            }
            Route::Stage {
                class_id,
                stage,
                session,
            } => self.run_stage(&class_id, stage, session.as_ref()).await,
            Route::RunSession { class_id } => self.run_session(&class_id).await,
            Route::CancelRun { class_id } => {
                let token = self
                    .runs
                    .get(&class_id)
                    .map(|entry| entry.value().clone())
                    .ok_or_else(|| {
                        ApiResponse::error(404, format!("no run in progress for class {class_id}"))
                    })?;
                token.cancel();
                tracing::warn!(class_id = %class_id, "run cancellation requested");
                Ok(ApiResponse::with_status(
                    202,
                    &json!({ "class_id": class_id, "cancelled": true }),
                ))
            }
            Route::List {
                class_id,
                group_by_session,
            } => Ok(ApiResponse::ok(
                &self.store.list_by_class(&class_id, group_by_session).await?,
            )),
            Route::Resolve {
                class_id,
                stage,
                session,
            } => {
                let resolved = ResultResolver::new(Arc::clone(&self.store))
                    .resolve(&class_id, stage, session.as_ref())
                    .await?
                    .ok_or_else(|| {
                        ApiResponse::error(404, format!("no {stage} result for class {class_id}"))
                    })?;
                Ok(ApiResponse::ok(&resolved))
            }
            Route::Progress { class_id } => {
                let snapshot = self
                    .board
                    .snapshot(&class_id)
                    .unwrap_or_else(|| ProgressReporter::new().snapshot());
                Ok(ApiResponse::ok(&snapshot))
            }
            Route::Get {
                class_id,
                result_id,
            } => Ok(ApiResponse::ok(
                &self.owned_result(&class_id, &result_id).await?,
            )),
            Route::DeleteOne {
                class_id,
                result_id,
            } => {
                self.owned_result(&class_id, &result_id).await?;
                let deleted = u64::from(self.store.delete_result(&result_id).await?);
                Ok(ApiResponse::ok(&DeleteResponse { deleted }))
            }
            Route::DeleteSession { class_id, session } => {
                let deleted = self.store.delete_session(&class_id, &session).await?;
                Ok(ApiResponse::ok(&DeleteResponse { deleted }))
            }
            Route::DeleteAll { class_id } => {
                let deleted = self.store.delete_all_for_class(&class_id).await?;
                Ok(ApiResponse::ok(&DeleteResponse { deleted }))
            }
            Route::UpdateSummary {
                class_id,
                result_id,
            } => {
                let summary = parse_summary(body)?;
                self.owned_result(&class_id, &result_id).await?;
                let updated = self
                    .store
                    .update_summary(&result_id, summary.as_deref())
                    .await?
                    .ok_or_else(|| not_found(&result_id))?;
                Ok(ApiResponse::ok(&updated))
            }
        }
    }

    fn executor(&self) -> Result<StageExecutor<LensService, A, JsonDirectorySource>, ApiResponse> {
        let analyzer = self
            .analyzer
            .clone()
            .ok_or_else(|| ApiResponse::error(503, "analyzer is not configured"))?;
        Ok(StageExecutor::new(
            Arc::clone(&self.store),
            analyzer,
            Arc::clone(&self.source),
        ))
    }

    async fn run_stage(
        &self,
        class_id: &str,
        stage: StageType,
        session: Option<&SessionId>,
    ) -> Reply {
        if let GuardDecision::Deny { reason } = self.guard.check(class_id, stage) {
            return Err(ApiResponse::error(403, reason));
        }
        let stored = self
            .executor()?
            .execute(class_id, stage, session)
            .await
            .map_err(ApiResponse::from)?;
        Ok(ApiResponse::ok(&stored))
    }

    async fn run_session(&self, class_id: &str) -> Reply {
        let coordinator =
            SessionCoordinator::new(self.executor()?, Arc::clone(&self.guard), self.locks.clone());
        let cancel = self.shutdown.child_token();
        let _registration = self.register_run(class_id, &cancel)?;
        let reporter = self.board.reporter(class_id);
        let report = coordinator
            .run(class_id, &cancel, reporter.as_ref())
            .await
            .map_err(ApiResponse::from)?;
        Ok(ApiResponse::ok(&report))
    }

    /// Publish a run's token for `CancelRun`. One HTTP run per class at a time.
    fn register_run(
        &self,
        class_id: &str,
        cancel: &CancellationToken,
    ) -> Result<RunRegistration<'_>, ApiResponse> {
        match self.runs.entry(class_id.to_string()) {
            Entry::Occupied(_) => Err(ApiResponse::from(RunError::AlreadyRunning {
                class_id: class_id.to_string(),
            })),
            Entry::Vacant(slot) => {
                slot.insert(cancel.clone());
                Ok(RunRegistration {
                    runs: &self.runs,
                    class_id: class_id.to_string(),
                })
            }
        }
    }

    /// Fetch a result, treating one that belongs to another class as missing.
    async fn owned_result(
        &self,
        class_id: &str,
        result_id: &str,
    ) -> Result<AnalysisResult, ApiResponse> {
        self.store
            .get_result(result_id)
            .await?
            .filter(|r| r.class_id == class_id)
            .ok_or_else(|| not_found(result_id))
    }
}

fn not_found(result_id: &str) -> ApiResponse {
    ApiResponse::error(404, format!("result '{result_id}' not found"))
}

/// `{"summary": "text"}` sets the summary; `{"summary": null}` clears it.
fn parse_summary(body: &str) -> Result<Option<String>, ApiResponse> {
    let bad = |message: &str| ApiResponse::error(400, message.to_string());
    let value: Value =
        serde_json::from_str(body).map_err(|e| bad(&format!("invalid JSON body: {e}")))?;
    match value.get("summary") {
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Null) => Ok(None),
        Some(_) => Err(bad("summary must be a string or null")),
        None => Err(bad("body must contain a summary field")),
    }
}
