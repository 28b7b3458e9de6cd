//! Entry repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Entries are always created for an existing author.
//! - Author listings are ordered by `id ASC`.

use crate::model::entry::{Entry, EntryId};
use crate::model::user::UserId;
use crate::repo::schema::ensure_table_ready;
use crate::repo::user_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    author_id,
    title,
    created_at,
    updated_at
FROM entries";

/// Repository interface for content entries.
pub trait EntryRepository {
    /// Creates one entry owned by `author_id`.
    fn create_entry(&self, author_id: UserId, title: &str) -> RepoResult<Entry>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    /// Lists entries owned by one author.
    fn list_entries_by_author(&self, author_id: UserId) -> RepoResult<Vec<Entry>>;
    fn count_entries(&self) -> RepoResult<u64>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "entries",
            &["id", "author_id", "title", "created_at", "updated_at"],
        )?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create_entry(&self, author_id: UserId, title: &str) -> RepoResult<Entry> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RepoError::InvalidInput(
                "entry title must not be blank".to_string(),
            ));
        }

        let author_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [author_id],
            |row| row.get(0),
        )?;
        if author_exists == 0 {
            return Err(RepoError::NotFound {
                entity: "user",
                id: author_id,
            });
        }

        self.conn.execute(
            "INSERT INTO entries (author_id, title) VALUES (?1, ?2);",
            params![author_id, title],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_entry(id)?
            .ok_or(RepoError::NotFound { entity: "entry", id })
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn list_entries_by_author(&self, author_id: UserId) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE author_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([author_id])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn count_entries(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative entry count `{count}`")))
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    Ok(Entry {
        id: row.get("id")?,
        author_id: row.get("author_id")?,
        title: row.get("title")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
