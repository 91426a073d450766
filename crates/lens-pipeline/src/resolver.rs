//! Read-side resolution of "the result to show" for a stage.
//!
//! With a session: that session's result for the stage if it exists,
//! otherwise the newest result of the stage type for the class from any
//! session. Without a session: the newest result directly. Callers get a
//! result whenever one exists for the stage type; [`ResolvedFrom`] tells them
//! whether it came from the requested session.

use std::sync::Arc;

use serde::Serialize;

use lens_core::entities::AnalysisResult;
use lens_core::enums::StageType;
use lens_core::ids::SessionId;
use lens_db::error::DatabaseError;

use crate::seams::ResultStore;

/// Which lookup produced a resolved result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedFrom {
    /// Exact match for the requested session.
    Session,
    /// Newest result of the stage type, regardless of session.
    Latest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub result: AnalysisResult,
    pub from: ResolvedFrom,
}

impl Resolved {
    /// True when a session was requested but the result belongs elsewhere.
    #[must_use]
    pub fn is_fallback(&self, requested: Option<&SessionId>) -> bool {
        requested.is_some() && self.from == ResolvedFrom::Latest
    }
}

pub struct ResultResolver<S> {
    store: Arc<S>,
}

impl<S: ResultStore> ResultResolver<S> {
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve the result for `(class_id, stage)`, preferring `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a store lookup fails.
    pub async fn resolve(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: Option<&SessionId>,
    ) -> Result<Option<Resolved>, DatabaseError> {
        if let Some(session_id) = session_id {
            if let Some(result) = self
                .store
                .get_by_session_and_type(class_id, stage, session_id)
                .await?
            {
                return Ok(Some(Resolved {
                    result,
                    from: ResolvedFrom::Session,
                }));
            }
            tracing::debug!(
                class_id,
                session_id = %session_id,
                %stage,
                "no result in session, falling back to latest"
            );
        }

        Ok(self
            .store
            .get_latest_by_type(class_id, stage)
            .await?
            .map(|result| Resolved {
                result,
                from: ResolvedFrom::Latest,
            }))
    }
}
