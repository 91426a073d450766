//! # lens-core
//!
//! Core types, ID generation, and error types for Classlens.
//!
//! This crate provides the foundational types shared across all Classlens crates:
//! - The fixed stage list (`overview`, `students-1` … `students-8`)
//! - Session identifiers and ID prefix constants
//! - Analysis result entities and session groupings
//! - Class roster snapshots and the per-stage payload sent to the analyzer
//! - Read-side interpretation of stored result data
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod result_data;
