//! Shared test utilities for lens-db unit tests.
