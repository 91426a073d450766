//! # lens-pipeline
//!
//! The staged analysis pipeline for a class.
//!
//! - [`StageExecutor`] runs one stage: builds the payload, calls the analysis
//!   service once, and upserts the output.
//! - [`SessionCoordinator`] mints a session and drives the executor through
//!   [`StageType::ALL`](lens_core::enums::StageType::ALL) in order, aborting on
//!   the first hard error.
//! - [`ResultResolver`] answers "which result to show" for a stage, falling
//!   back to the newest result of that stage when the session has none.
//! - [`ProgressReporter`] observes a run through [`ProgressSink`] events.
//!
//! External collaborators sit behind the traits in [`seams`]: the result
//! store, the analysis service, the class data source and the write guard.

pub mod coordinator;
pub mod error;
pub mod executor;
pub mod guard;
pub mod lock;
pub mod partition;
pub mod progress;
pub mod resolver;
pub mod seams;
pub mod source;

pub use coordinator::{RunReport, SessionCoordinator, StageOutcome};
pub use error::{ClassDataError, RunError, ServiceError, StageError};
pub use executor::StageExecutor;
pub use guard::{AllowAll, GuardDecision, RestrictedClassGuard, WriteGuard};
pub use lock::{ClassLocks, ClassRunGuard};
pub use progress::{
    NoProgress, ProgressBoard, ProgressEvent, ProgressReporter, ProgressSink, ProgressSnapshot,
};
pub use resolver::{Resolved, ResolvedFrom, ResultResolver};
pub use seams::{AnalysisService, ResultStore};
pub use source::{ClassDataSource, JsonDirectorySource};
