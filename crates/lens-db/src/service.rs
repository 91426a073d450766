//! Service layer wrapping the database handle.
//!
//! `LensService` wraps `LensDb`. All repository methods are implemented as
//! `impl LensService` blocks under [`crate::repos`].

use crate::LensDb;
use crate::error::DatabaseError;

/// Entry point for analysis result storage.
pub struct LensService {
    db: LensDb,
}

impl LensService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = LensDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `LensDb`.
    #[must_use]
    pub const fn from_db(db: LensDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LensDb {
        &self.db
    }
}
