//! Run progress: events emitted by the coordinator and the observers that
//! consume them.
//!
//! Progress is observational only. A sink cannot influence the run, and a
//! run with no interested observer passes [`NoProgress`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

use lens_core::enums::{RunStatus, StageType};
use lens_core::ids::SessionId;

/// Events emitted by [`SessionCoordinator::run`](crate::SessionCoordinator::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A session was minted and the first stage is about to start.
    RunStarted {
        class_id: String,
        session_id: SessionId,
        total_stages: usize,
        started_at: DateTime<Utc>,
    },
    /// A stage is about to run (or be skipped by the write guard).
    StageStarted {
        stage: StageType,
        /// Zero-based position in the stage sequence.
        index: usize,
        label: String,
    },
    /// A stage finished without error.
    StageFinished {
        stage: StageType,
        index: usize,
        /// False when the write guard skipped the stage.
        persisted: bool,
    },
    /// The run ended: completed, failed or cancelled.
    RunFinished {
        status: RunStatus,
        elapsed: Duration,
    },
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for Arc<T> {
    fn on_event(&self, event: &ProgressEvent) {
        (**self).on_event(event);
    }
}

/// Point-in-time view of a [`ProgressReporter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub class_id: Option<String>,
    pub session_id: Option<SessionId>,
    pub running: bool,
    pub current_stage: Option<StageType>,
    pub current_stage_label: Option<String>,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub elapsed_seconds: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub status: Option<RunStatus>,
}

#[derive(Debug, Default)]
struct ReporterState {
    class_id: Option<String>,
    session_id: Option<SessionId>,
    running: bool,
    current_stage: Option<StageType>,
    current_label: Option<String>,
    completed_stages: usize,
    total_stages: usize,
    started: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    final_elapsed: Option<Duration>,
    status: Option<RunStatus>,
}

impl ReporterState {
    fn elapsed(&self) -> Duration {
        match (self.final_elapsed, self.started) {
            (Some(elapsed), _) => elapsed,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }
}

/// Tracks the latest run it was attached to: current stage label, elapsed
/// time, running or idle.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    state: Mutex<ReporterState>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of the stage in flight, `None` when idle.
    #[must_use]
    pub fn current_stage_label(&self) -> Option<String> {
        self.state.lock().current_label.clone()
    }

    /// Whole seconds since the run started, frozen once it finishes.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.state.lock().elapsed().as_secs()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state.lock();
        ProgressSnapshot {
            class_id: state.class_id.clone(),
            session_id: state.session_id.clone(),
            running: state.running,
            current_stage: state.current_stage,
            current_stage_label: state.current_label.clone(),
            completed_stages: state.completed_stages,
            total_stages: state.total_stages,
            elapsed_seconds: state.elapsed().as_secs(),
            started_at: state.started_at,
            status: state.status,
        }
    }
}

impl ProgressSink for ProgressReporter {
    fn on_event(&self, event: &ProgressEvent) {
        let mut state = self.state.lock();
        match event {
            ProgressEvent::RunStarted {
                class_id,
                session_id,
                total_stages,
                started_at,
            } => {
                *state = ReporterState {
                    class_id: Some(class_id.clone()),
                    session_id: Some(session_id.clone()),
                    running: true,
                    total_stages: *total_stages,
                    started: Some(Instant::now()),
                    started_at: Some(*started_at),
                    ..ReporterState::default()
                };
            }
            ProgressEvent::StageStarted { stage, label, .. } => {
                state.current_stage = Some(*stage);
                state.current_label = Some(label.clone());
            }
            ProgressEvent::StageFinished { .. } => {
                state.completed_stages += 1;
            }
            ProgressEvent::RunFinished { status, elapsed } => {
                state.running = false;
                state.current_stage = None;
                state.current_label = None;
                state.final_elapsed = Some(*elapsed);
                state.status = Some(*status);
            }
        }
    }
}

/// One [`ProgressReporter`] per class, for callers that poll by class ID.
#[derive(Debug, Clone, Default)]
pub struct ProgressBoard {
    reporters: Arc<DashMap<String, Arc<ProgressReporter>>>,
}

impl ProgressBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The reporter for `class_id`, created on first use.
    #[must_use]
    pub fn reporter(&self, class_id: &str) -> Arc<ProgressReporter> {
        Arc::clone(
            self.reporters
                .entry(class_id.to_string())
                .or_insert_with(|| Arc::new(ProgressReporter::new()))
                .value(),
        )
    }

    /// Snapshot for `class_id`, or `None` if no run was ever reported.
    #[must_use]
    pub fn snapshot(&self, class_id: &str) -> Option<ProgressSnapshot> {
        self.reporters.get(class_id).map(|r| r.snapshot())
    }
}
