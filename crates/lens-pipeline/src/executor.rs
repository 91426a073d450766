//! Single-stage execution.

use std::sync::Arc;

use lens_core::entities::{AnalysisResult, ClassSnapshot, NewAnalysisResult, StagePayload};
use lens_core::enums::StageType;
use lens_core::ids::SessionId;

use crate::error::{ServiceError, StageError};
use crate::partition::partition;
use crate::seams::{AnalysisService, ResultStore};
use crate::source::ClassDataSource;

/// Build the payload for `stage` from a class snapshot.
///
/// `overview` covers the whole ordered roster; `students-N` covers group N.
#[must_use]
pub fn stage_payload(snapshot: &ClassSnapshot, stage: StageType) -> StagePayload {
    let ordered = snapshot.ordered_students();
    let students = match stage.group() {
        None => ordered.clone(),
        Some(group) => partition(&ordered, group).to_vec(),
    };
    StagePayload {
        class_id: snapshot.class_id.clone(),
        class_name: snapshot.name.clone(),
        stage,
        group: stage.group(),
        students,
        roster_size: ordered.len(),
        context: snapshot.context.clone(),
    }
}

/// Runs exactly one stage: payload, one service call, one upsert.
///
/// Never retries and never persists on failure.
pub struct StageExecutor<S, A, D> {
    store: Arc<S>,
    service: Arc<A>,
    source: Arc<D>,
}

impl<S, A, D> StageExecutor<S, A, D>
where
    S: ResultStore,
    A: AnalysisService,
    D: ClassDataSource,
{
    pub const fn new(store: Arc<S>, service: Arc<A>, source: Arc<D>) -> Self {
        Self {
            store,
            service,
            source,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load current class data and build the payload for `stage`.
    ///
    /// # Errors
    ///
    /// Returns `StageError::ClassData` if the class cannot be loaded.
    pub async fn build_payload(
        &self,
        class_id: &str,
        stage: StageType,
    ) -> Result<StagePayload, StageError> {
        let snapshot = self.source.load_class(class_id).await?;
        Ok(stage_payload(&snapshot, stage))
    }

    /// Execute `stage` for `class_id`, persisting under `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `StageError` if class data cannot be loaded, the service call
    /// fails or returns blank output, or the upsert fails.
    pub async fn execute(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: Option<&SessionId>,
    ) -> Result<AnalysisResult, StageError> {
        let payload = self.build_payload(class_id, stage).await?;
        tracing::debug!(
            class_id,
            session_id = session_id.map(SessionId::as_str),
            %stage,
            students = payload.students.len(),
            "executing stage"
        );

        let output = self.service.analyze(&payload).await?;
        if output.trim().is_empty() {
            return Err(ServiceError::EmptyOutput.into());
        }

        let new = NewAnalysisResult::new(class_id, stage, session_id.cloned(), output);
        let stored = self.store.upsert(&new).await?;
        tracing::debug!(
            class_id,
            result_id = %stored.id,
            %stage,
            "stage result persisted"
        );
        Ok(stored)
    }
}
