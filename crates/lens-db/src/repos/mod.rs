//! Repository methods, one module per table.

pub mod analysis_result;
