//! Deprecation log store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist deprecation warnings with upsert-by-fingerprint semantics.
//! - Serve log lookups for the debug panel.
//!
//! # Invariants
//! - `(key, fingerprint)` is unique; repeated hits refresh one row.
//! - Listing order is `last_occurrence DESC, id DESC`.
//! - `delete_all_logs` on an empty store succeeds and returns `0`.

use crate::model::deprecation::{
    DeprecationLog, DeprecationLogId, NewDeprecationLog, TraceFrame,
};
use crate::repo::schema::ensure_table_ready;
use crate::repo::user_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const LOG_SELECT_SQL: &str = "SELECT
    id,
    key,
    fingerprint,
    last_occurrence,
    file,
    line,
    message,
    traces
FROM deprecation_errors";

/// Storage interface for deprecation warnings.
pub trait DeprecationLogStore {
    /// Inserts a warning or refreshes the existing one with the same
    /// `(key, fingerprint)`.
    fn upsert_log(&self, log: &NewDeprecationLog) -> RepoResult<DeprecationLog>;
    fn get_log(&self, id: DeprecationLogId) -> RepoResult<Option<DeprecationLog>>;
    fn list_logs(&self) -> RepoResult<Vec<DeprecationLog>>;
    /// Removes every stored warning and returns how many were removed.
    fn delete_all_logs(&self) -> RepoResult<usize>;
}

/// SQLite-backed deprecation log store.
pub struct SqliteDeprecationLogStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeprecationLogStore<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "deprecation_errors",
            &[
                "id",
                "key",
                "fingerprint",
                "last_occurrence",
                "file",
                "line",
                "message",
                "traces",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl DeprecationLogStore for SqliteDeprecationLogStore<'_> {
    fn upsert_log(&self, log: &NewDeprecationLog) -> RepoResult<DeprecationLog> {
        if log.key.trim().is_empty() {
            return Err(RepoError::InvalidInput(
                "deprecation key must not be blank".to_string(),
            ));
        }

        let fingerprint = log.fingerprint();
        let traces = serde_json::to_string(&log.traces).map_err(|err| {
            RepoError::InvalidInput(format!("deprecation traces are not serializable: {err}"))
        })?;

        self.conn.execute(
            "INSERT INTO deprecation_errors (
                key,
                fingerprint,
                last_occurrence,
                file,
                line,
                message,
                traces
            ) VALUES (
                ?1,
                ?2,
                CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER),
                ?3,
                ?4,
                ?5,
                ?6
            )
            ON CONFLICT (key, fingerprint) DO UPDATE SET
                last_occurrence = excluded.last_occurrence,
                file = excluded.file,
                line = excluded.line,
                message = excluded.message,
                traces = excluded.traces;",
            params![
                log.key.as_str(),
                fingerprint.as_str(),
                log.file.as_deref(),
                log.line,
                log.message.as_str(),
                traces,
            ],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "{LOG_SELECT_SQL} WHERE key = ?1 AND fingerprint = ?2;"
        ))?;
        let mut rows = stmt.query(params![log.key.as_str(), fingerprint.as_str()])?;
        match rows.next()? {
            Some(row) => parse_log_row(row),
            None => Err(RepoError::InvalidData(format!(
                "deprecation log `{}` missing after upsert",
                log.key
            ))),
        }
    }

    fn get_log(&self, id: DeprecationLogId) -> RepoResult<Option<DeprecationLog>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOG_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_log_row(row)?));
        }
        Ok(None)
    }

    fn list_logs(&self) -> RepoResult<Vec<DeprecationLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LOG_SELECT_SQL} ORDER BY last_occurrence DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next()? {
            logs.push(parse_log_row(row)?);
        }
        Ok(logs)
    }

    fn delete_all_logs(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM deprecation_errors;", [])?)
    }
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<DeprecationLog> {
    let line = match row.get::<_, Option<i64>>("line")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid line `{value}` in deprecation_errors.line"
            ))
        })?),
        None => None,
    };

    let traces_text: String = row.get("traces")?;
    let traces: Vec<TraceFrame> = serde_json::from_str(&traces_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid traces in deprecation_errors.traces: {err}"))
    })?;

    Ok(DeprecationLog {
        id: row.get("id")?,
        key: row.get("key")?,
        fingerprint: row.get("fingerprint")?,
        last_occurrence: row.get("last_occurrence")?,
        file: row.get("file")?,
        line,
        message: row.get("message")?,
        traces,
    })
}
