//! In-crate fakes for the pipeline's collaborator traits.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use lens_core::entities::{AnalysisResult, ClassSnapshot, NewAnalysisResult, StagePayload, Student};
use lens_core::enums::StageType;
use lens_core::ids::SessionId;
use lens_db::error::DatabaseError;
use lens_db::service::LensService;
use lens_pipeline::{
    AnalysisService, ClassDataError, ClassDataSource, ClassLocks, GuardDecision, ProgressEvent,
    ProgressSink, ResultStore, ServiceError, SessionCoordinator, StageExecutor, WriteGuard,
};

pub const CLASS: &str = "cls-7a";

pub async fn memory_store() -> LensService {
    LensService::new_local(":memory:").await.unwrap()
}

pub fn roster(n: usize) -> ClassSnapshot {
    ClassSnapshot {
        class_id: CLASS.to_string(),
        name: "7A".to_string(),
        students: (0..n)
            .rev()
            .map(|i| Student {
                id: format!("stu-{i:02}"),
                name: format!("Student {i}"),
                attributes: serde_json::Value::Null,
            })
            .collect(),
        context: serde_json::json!({"survey": "autumn"}),
    }
}

/// Serves the same snapshot for every class ID it knows.
pub struct StaticSource {
    pub snapshot: ClassSnapshot,
}

impl ClassDataSource for StaticSource {
    async fn load_class(&self, class_id: &str) -> Result<ClassSnapshot, ClassDataError> {
        if class_id == self.snapshot.class_id {
            Ok(self.snapshot.clone())
        } else {
            Err(ClassDataError::NotFound(class_id.to_string()))
        }
    }
}

/// Records every call; fails on `fail_on` when set.
#[derive(Default)]
pub struct ScriptedService {
    pub fail_on: Option<StageType>,
    calls: Mutex<Vec<StagePayload>>,
}

impl ScriptedService {
    pub fn failing_on(stage: StageType) -> Self {
        Self {
            fail_on: Some(stage),
            ..Self::default()
        }
    }

    pub fn called_stages(&self) -> Vec<StageType> {
        self.calls.lock().iter().map(|p| p.stage).collect()
    }

    pub fn payloads(&self) -> Vec<StagePayload> {
        self.calls.lock().clone()
    }
}

impl AnalysisService for ScriptedService {
    async fn analyze(&self, payload: &StagePayload) -> Result<String, ServiceError> {
        self.calls.lock().push(payload.clone());
        if self.fail_on == Some(payload.stage) {
            return Err(ServiceError::Other(format!(
                "upstream rejected {}",
                payload.stage
            )));
        }
        Ok(format!(
            "{} covering {} students",
            payload.stage,
            payload.students.len()
        ))
    }
}

/// Real store that refuses to persist one stage type.
pub struct FailingStore {
    pub inner: LensService,
    pub fail_on: StageType,
}

impl ResultStore for FailingStore {
    async fn upsert(&self, new: &NewAnalysisResult) -> Result<AnalysisResult, DatabaseError> {
        if new.stage_type == self.fail_on {
            return Err(DatabaseError::Query("disk I/O error".to_string()));
        }
        self.inner.upsert_result(new).await
    }

    async fn get_by_session_and_type(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: &SessionId,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        self.inner
            .get_by_session_and_type(class_id, stage, session_id)
            .await
    }

    async fn get_latest_by_type(
        &self,
        class_id: &str,
        stage: StageType,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        self.inner.get_latest_by_type(class_id, stage).await
    }
}

pub struct DenyAll;

impl WriteGuard for DenyAll {
    fn check(&self, _class_id: &str, _stage: StageType) -> GuardDecision {
        GuardDecision::Deny {
            reason: "demo account".to_string(),
        }
    }
}

/// Collects every event it sees.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn started_labels(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::StageStarted { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Cancels `token` as soon as `after` finishes.
pub struct CancelAfter {
    pub token: CancellationToken,
    pub after: StageType,
}

impl ProgressSink for CancelAfter {
    fn on_event(&self, event: &ProgressEvent) {
        if let ProgressEvent::StageFinished { stage, .. } = event {
            if *stage == self.after {
                self.token.cancel();
            }
        }
    }
}

pub fn coordinator<S, A, G>(
    store: Arc<S>,
    service: Arc<A>,
    guard: G,
    locks: ClassLocks,
) -> SessionCoordinator<S, A, StaticSource, G>
where
    S: ResultStore,
    A: AnalysisService,
    G: WriteGuard,
{
    let source = Arc::new(StaticSource { snapshot: roster(20) });
    SessionCoordinator::new(
        StageExecutor::new(store, service, source),
        Arc::new(guard),
        locks,
    )
}
