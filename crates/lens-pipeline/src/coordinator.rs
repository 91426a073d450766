//! Session coordinator: one session, every stage, in order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use lens_core::enums::{RunStatus, StageType};
use lens_core::ids::SessionId;

use crate::error::RunError;
use crate::executor::StageExecutor;
use crate::guard::{GuardDecision, WriteGuard};
use crate::lock::ClassLocks;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::seams::{AnalysisService, ResultStore};
use crate::source::ClassDataSource;

/// What happened to one stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The stage ran and its result was stored.
    Persisted { stage: StageType, result_id: String },
    /// The write guard denied the stage; nothing ran or was stored.
    Skipped { stage: StageType, reason: String },
}

impl StageOutcome {
    #[must_use]
    pub const fn stage(&self) -> StageType {
        match self {
            Self::Persisted { stage, .. } | Self::Skipped { stage, .. } => *stage,
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub class_id: String,
    pub session_id: SessionId,
    pub status: RunStatus,
    /// Finished stages, in execution order.
    pub outcomes: Vec<StageOutcome>,
    pub elapsed_ms: u64,
}

impl RunReport {
    #[must_use]
    pub fn persisted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StageOutcome::Persisted { .. }))
            .count()
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Drives [`StageExecutor`] through [`StageType::ALL`] under a fresh session.
///
/// Stages run strictly one after another. The first failing stage aborts the
/// rest. Cancellation is honoured between stages only; a stage already in
/// flight is allowed to finish and persist.
pub struct SessionCoordinator<S, A, D, G> {
    executor: StageExecutor<S, A, D>,
    guard: Arc<G>,
    locks: ClassLocks,
}

impl<S, A, D, G> SessionCoordinator<S, A, D, G>
where
    S: ResultStore,
    A: AnalysisService,
    D: ClassDataSource,
    G: WriteGuard,
{
    pub const fn new(executor: StageExecutor<S, A, D>, guard: Arc<G>, locks: ClassLocks) -> Self {
        Self {
            executor,
            guard,
            locks,
        }
    }

    #[must_use]
    pub const fn executor(&self) -> &StageExecutor<S, A, D> {
        &self.executor
    }

    #[must_use]
    pub fn guard(&self) -> &G {
        &self.guard
    }

    #[must_use]
    pub const fn locks(&self) -> &ClassLocks {
        &self.locks
    }

    /// Run every stage for `class_id` under a newly minted session.
    ///
    /// Returns `Ok` for completed and cancelled runs; the report's status
    /// tells them apart.
    ///
    /// # Errors
    ///
    /// - `RunError::AlreadyRunning` if another run holds this class.
    /// - `RunError::StageFailed` on the first stage error, carrying the partial report.
    /// - `RunError::Core` if no session ID could be minted.
    pub async fn run(
        &self,
        class_id: &str,
        cancel: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Result<RunReport, RunError> {
        let _lock = self
            .locks
            .try_acquire(class_id)
            .ok_or_else(|| RunError::AlreadyRunning {
                class_id: class_id.to_string(),
            })?;
        let session_id = SessionId::generate()?;
        let started = Instant::now();

        tracing::info!(class_id, session_id = %session_id, "analysis run started");
        progress.on_event(&ProgressEvent::RunStarted {
            class_id: class_id.to_string(),
            session_id: session_id.clone(),
            total_stages: StageType::ALL.len(),
            started_at: Utc::now(),
        });

        let mut report = RunReport {
            class_id: class_id.to_string(),
            session_id: session_id.clone(),
            status: RunStatus::Completed,
            outcomes: Vec::with_capacity(StageType::ALL.len()),
            elapsed_ms: 0,
        };

        for (index, stage) in StageType::ALL.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::warn!(
                    class_id,
                    session_id = %session_id,
                    next_stage = %stage,
                    "analysis run cancelled"
                );
                report.status = RunStatus::Cancelled;
                break;
            }

            progress.on_event(&ProgressEvent::StageStarted {
                stage,
                index,
                label: stage.label(),
            });

            let outcome = match self.guard.check(class_id, stage) {
                GuardDecision::Deny { reason } => {
                    tracing::warn!(class_id, %stage, %reason, "write guard denied stage");
                    StageOutcome::Skipped { stage, reason }
                }
                GuardDecision::Allow => {
                    match self
                        .executor
                        .execute(class_id, stage, Some(&session_id))
                        .await
                    {
                        Ok(stored) => StageOutcome::Persisted {
                            stage,
                            result_id: stored.id,
                        },
                        Err(source) => {
                            tracing::error!(
                                class_id,
                                session_id = %session_id,
                                %stage,
                                error = %source,
                                "stage failed, aborting run"
                            );
                            let elapsed = started.elapsed();
                            report.status = RunStatus::Failed;
                            report.elapsed_ms = millis(elapsed);
                            progress.on_event(&ProgressEvent::RunFinished {
                                status: RunStatus::Failed,
                                elapsed,
                            });
                            return Err(RunError::StageFailed {
                                session_id,
                                stage,
                                report: Box::new(report),
                                source,
                            });
                        }
                    }
                }
            };

            progress.on_event(&ProgressEvent::StageFinished {
                stage,
                index,
                persisted: matches!(outcome, StageOutcome::Persisted { .. }),
            });
            report.outcomes.push(outcome);
        }

        let elapsed = started.elapsed();
        report.elapsed_ms = millis(elapsed);
        tracing::info!(
            class_id,
            session_id = %session_id,
            status = %report.status,
            persisted = report.persisted_count(),
            elapsed_ms = report.elapsed_ms,
            "analysis run finished"
        );
        progress.on_event(&ProgressEvent::RunFinished {
            status: report.status,
            elapsed,
        });
        Ok(report)
    }
}
