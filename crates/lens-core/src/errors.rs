//! Cross-cutting error types for Classlens.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `AnalyzerError`) are defined
//! in their respective crates. A unified error is deferred to `lens-cli` where
//! all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any Classlens crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A stage name did not match any known stage.
    #[error("Unknown stage type '{0}' (expected overview or students-1 .. students-8)")]
    UnknownStage(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
