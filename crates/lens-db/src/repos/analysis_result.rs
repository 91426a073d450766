//! Analysis result repository: upsert, lookups, session grouping, deletes.
//!
//! Upsert key is `(class_id, stage_type, session_id)`. A result with a session
//! replaces the existing row for that key in place (the row keeps its `id`;
//! `result_data`, `summary` and `created_at` are overwritten). A result with
//! no session always inserts a new row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use lens_core::entities::{AnalysisResult, NewAnalysisResult, ResultListing, SessionGroup};
use lens_core::enums::StageType;
use lens_core::ids::{PREFIX_RESULT, SessionId};

use crate::error::DatabaseError;
use crate::helpers::{format_timestamp, get_opt_string, parse_datetime, parse_enum};
use crate::service::LensService;

const RESULT_COLUMNS: &str =
    "id, class_id, session_id, stage_type, result_data, summary, created_at";

/// Newest first by instant, so hand-inserted `YYYY-MM-DD HH:MM:SS` rows sort
/// correctly against canonical ones. `julianday` has millisecond resolution;
/// the canonical text then orders within the millisecond.
const NEWEST_FIRST: &str = "julianday(created_at) DESC, created_at DESC, id DESC";

fn row_to_result(row: &libsql::Row) -> Result<AnalysisResult, DatabaseError> {
    Ok(AnalysisResult {
        id: row.get::<String>(0)?,
        class_id: row.get::<String>(1)?,
        session_id: get_opt_string(row, 2)?.as_deref().and_then(SessionId::parse),
        stage_type: parse_enum(&row.get::<String>(3)?)?,
        result_data: row.get::<String>(4)?,
        summary: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn collect_results(mut rows: libsql::Rows) -> Result<Vec<AnalysisResult>, DatabaseError> {
    let mut results = Vec::new();
    while let Some(row) = rows.next().await? {
        results.push(row_to_result(&row)?);
    }
    Ok(results)
}

impl LensService {
    /// Insert or replace a result, stamping it with the current time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the write or the read-back fails.
    pub async fn upsert_result(
        &self,
        new: &NewAnalysisResult,
    ) -> Result<AnalysisResult, DatabaseError> {
        self.upsert_result_at(new, Utc::now()).await
    }

    /// Insert or replace a result with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the write or the read-back fails.
    pub async fn upsert_result_at(
        &self,
        new: &NewAnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Result<AnalysisResult, DatabaseError> {
        let id = self.db().generate_id(PREFIX_RESULT).await?;
        let ts = format_timestamp(created_at);
        match &new.session_id {
            None => {
                self.db()
                    .conn()
                    .execute(
                        "INSERT INTO analysis_results
                         (id, class_id, session_id, stage_type, result_data, summary, created_at)
                         VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?6)",
                        libsql::params![
                            id.as_str(),
                            new.class_id.as_str(),
                            new.stage_type.as_str(),
                            new.result_data.as_str(),
                            new.summary.as_deref(),
                            ts.as_str()
                        ],
                    )
                    .await?;
                tracing::debug!(
                    result_id = %id,
                    class_id = %new.class_id,
                    stage = %new.stage_type,
                    "inserted sessionless analysis result"
                );
                self.get_result(&id).await?.ok_or(DatabaseError::NoResult)
            }
            Some(session) => {
                self.db()
                    .conn()
                    .execute(
                        "INSERT INTO analysis_results
                         (id, class_id, session_id, stage_type, result_data, summary, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                         ON CONFLICT (class_id, stage_type, session_id) DO UPDATE SET
                             result_data = excluded.result_data,
                             summary = excluded.summary,
                             created_at = excluded.created_at",
                        libsql::params![
                            id.as_str(),
                            new.class_id.as_str(),
                            session.as_str(),
                            new.stage_type.as_str(),
                            new.result_data.as_str(),
                            new.summary.as_deref(),
                            ts.as_str()
                        ],
                    )
                    .await?;
                tracing::debug!(
                    class_id = %new.class_id,
                    session_id = %session,
                    stage = %new.stage_type,
                    "upserted session analysis result"
                );
                self.get_by_session_and_type(&new.class_id, new.stage_type, session)
                    .await?
                    .ok_or(DatabaseError::NoResult)
            }
        }
    }

    /// Fetch one result by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_result(&self, id: &str) -> Result<Option<AnalysisResult>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {RESULT_COLUMNS} FROM analysis_results WHERE id = ?1"),
                [id],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_result(&row))
            .transpose()
    }

    /// The result for exactly this class, stage and session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_by_session_and_type(
        &self,
        class_id: &str,
        stage: StageType,
        session_id: &SessionId,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RESULT_COLUMNS} FROM analysis_results
                     WHERE class_id = ?1 AND stage_type = ?2 AND session_id = ?3"
                ),
                libsql::params![class_id, stage.as_str(), session_id.as_str()],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_result(&row))
            .transpose()
    }

    /// The newest result of this stage type for the class, across all sessions.
    ///
    /// Ties on `created_at` go to the greater `id`. Rows stored in `SQLite`'s
    /// `datetime('now')` format compare by instant with canonical rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_latest_by_type(
        &self,
        class_id: &str,
        stage: StageType,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RESULT_COLUMNS} FROM analysis_results
                     WHERE class_id = ?1 AND stage_type = ?2
                     ORDER BY {NEWEST_FIRST} LIMIT 1"
                ),
                libsql::params![class_id, stage.as_str()],
            )
            .await?;
        rows.next()
            .await?
            .map(|row| row_to_result(&row))
            .transpose()
    }

    /// Every result for a class, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_results(&self, class_id: &str) -> Result<Vec<AnalysisResult>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {RESULT_COLUMNS} FROM analysis_results
                     WHERE class_id = ?1 ORDER BY {NEWEST_FIRST}"
                ),
                [class_id],
            )
            .await?;
        collect_results(rows).await
    }

    /// Results for a class clustered by session.
    ///
    /// Rows with no session are each their own group. Groups are ordered by
    /// their newest `created_at`, descending.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_session_groups(
        &self,
        class_id: &str,
    ) -> Result<Vec<SessionGroup>, DatabaseError> {
        let results = self.list_results(class_id).await?;

        let mut order: Vec<SessionId> = Vec::new();
        let mut by_session: HashMap<SessionId, Vec<AnalysisResult>> = HashMap::new();
        let mut groups = Vec::new();

        for result in results {
            match result.session_id.clone() {
                Some(session) => {
                    by_session
                        .entry(session.clone())
                        .or_insert_with(|| {
                            order.push(session);
                            Vec::new()
                        })
                        .push(result);
                }
                None => groups.extend(SessionGroup::from_results(None, vec![result])),
            }
        }
        for session in order {
            if let Some(members) = by_session.remove(&session) {
                groups.extend(SessionGroup::from_results(Some(session), members));
            }
        }

        groups.sort_by(|a, b| b.latest_created_at.cmp(&a.latest_created_at));
        Ok(groups)
    }

    /// Flat or grouped listing, as selected by `group_by_session`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_by_class(
        &self,
        class_id: &str,
        group_by_session: bool,
    ) -> Result<ResultListing, DatabaseError> {
        if group_by_session {
            Ok(ResultListing::Grouped(
                self.list_session_groups(class_id).await?,
            ))
        } else {
            Ok(ResultListing::Flat(self.list_results(class_id).await?))
        }
    }

    /// Replace the user annotation on a result. `None` clears it.
    ///
    /// Returns `None` if no result has this ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the update fails.
    pub async fn update_summary(
        &self,
        id: &str,
        summary: Option<&str>,
    ) -> Result<Option<AnalysisResult>, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE analysis_results SET summary = ?1 WHERE id = ?2",
                libsql::params![summary, id],
            )
            .await?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_result(id).await
    }

    /// Delete one result. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_result(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM analysis_results WHERE id = ?1", [id])
            .await?;
        Ok(changed > 0)
    }

    /// Delete every result of one session for a class. Returns the row count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_session(
        &self,
        class_id: &str,
        session_id: &SessionId,
    ) -> Result<u64, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "DELETE FROM analysis_results WHERE class_id = ?1 AND session_id = ?2",
                libsql::params![class_id, session_id.as_str()],
            )
            .await?;
        tracing::info!(class_id, session_id = %session_id, deleted = changed, "deleted session results");
        Ok(changed)
    }

    /// Delete every result for a class. Returns the row count.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_all_for_class(&self, class_id: &str) -> Result<u64, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute("DELETE FROM analysis_results WHERE class_id = ?1", [class_id])
            .await?;
        tracing::info!(class_id, deleted = changed, "deleted all class results");
        Ok(changed)
    }
}
