//! Traits for the pipeline's external collaborators that are awaited.
//!
//! [`ResultStore`] is implemented for the libSQL-backed
//! [`LensService`]; [`AnalysisService`] for [`AnalyzerClient`]. Tests
//! substitute their own implementations.

use std::future::Future;

use lens_analyzer::AnalyzerClient;
use lens_core::entities::{AnalysisResult, NewAnalysisResult, StagePayload};
use lens_core::enums::StageType;
use lens_core::ids::SessionId;
use lens_db::error::DatabaseError;
use lens_db::service::LensService;

use crate::error::ServiceError;

/// Persistence and lookup of analysis results.
pub trait ResultStore: Send + Sync {
    /// Insert-or-replace by `(class_id, stage_type, session_id)`; always insert
    /// when `session_id` is `None`.
    fn upsert(
        &self,
        new: &NewAnalysisResult,
    ) -> impl Future<Output = Result<AnalysisResult, DatabaseError>> + Send;

    fn get_by_session_and_type(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Option<AnalysisResult>, DatabaseError>> + Send;

    fn get_latest_by_type(
        &self,
        class_id: &str,
        stage: StageType,
    ) -> impl Future<Output = Result<Option<AnalysisResult>, DatabaseError>> + Send;
}

impl ResultStore for LensService {
    async fn upsert(&self, new: &NewAnalysisResult) -> Result<AnalysisResult, DatabaseError> {
        self.upsert_result(new).await
    }

    async fn get_by_session_and_type(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: &SessionId,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        Self::get_by_session_and_type(self, class_id, stage, session_id).await
    }

    async fn get_latest_by_type(
        &self,
        class_id: &str,
        stage: StageType,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        Self::get_latest_by_type(self, class_id, stage).await
    }
}

/// The external generative-text service. One call per stage, no retries.
pub trait AnalysisService: Send + Sync {
    fn analyze(
        &self,
        payload: &StagePayload,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

impl AnalysisService for AnalyzerClient {
    async fn analyze(&self, payload: &StagePayload) -> Result<String, ServiceError> {
        Ok(Self::analyze(self, payload).await?)
    }
}
