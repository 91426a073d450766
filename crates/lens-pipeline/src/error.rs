//! Pipeline error types.
//!
//! A write-guard denial is not an error: it becomes
//! [`StageOutcome::Skipped`](crate::StageOutcome::Skipped).

use std::path::PathBuf;

use lens_analyzer::AnalyzerError;
use lens_core::enums::StageType;
use lens_core::errors::CoreError;
use lens_core::ids::SessionId;
use lens_db::error::DatabaseError;
use thiserror::Error;

use crate::coordinator::RunReport;

/// The analysis call failed or produced unusable output.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    #[error("analysis service returned empty output")]
    EmptyOutput,

    #[error("{0}")]
    Other(String),
}

/// Class data could not be loaded for a payload.
#[derive(Debug, Error)]
pub enum ClassDataError {
    #[error("class '{0}' not found")]
    NotFound(String),

    #[error("invalid class id '{0}'")]
    InvalidId(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid class data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A single stage failed. Nothing was persisted for it.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("analysis service failed: {0}")]
    Service(#[from] ServiceError),

    #[error("result store failed: {0}")]
    Store(#[from] DatabaseError),

    #[error("class data unavailable: {0}")]
    ClassData(#[from] ClassDataError),
}

/// A coordinator run did not complete.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("an analysis run is already in progress for class '{class_id}'")]
    AlreadyRunning { class_id: String },

    #[error("stage {stage} failed in session {session_id}: {source}")]
    StageFailed {
        session_id: SessionId,
        stage: StageType,
        /// Report of the aborted run; holds the stages that finished before the failure.
        report: Box<RunReport>,
        #[source]
        source: StageError,
    },

    #[error("could not start run: {0}")]
    Core(#[from] CoreError),
}
