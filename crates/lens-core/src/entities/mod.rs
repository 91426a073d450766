//! Entity structs for Classlens domain objects.
//!
//! `AnalysisResult` maps to the `analysis_results` table. Sessions are not
//! stored; `SessionGroup` is assembled from rows sharing a `session_id`.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod analysis_result;
mod class;
mod payload;
mod session_group;

pub use analysis_result::{AnalysisResult, NewAnalysisResult};
pub use class::{ClassSnapshot, Student};
pub use payload::StagePayload;
pub use session_group::{ResultListing, SessionGroup};
