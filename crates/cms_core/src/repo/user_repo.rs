//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide user lookup, creation and deletion over the `users` table.
//! - Own the content reassignment that happens when a user is deleted.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - `delete_user` moves or removes the user's entries and deletes the user
//!   row in one transaction; a failure leaves both untouched.
//! - `find_users_by_ids` keeps caller order.

use crate::db::DbError;
use crate::model::user::{NewUser, User, UserId, UserStatus, UserValidationError};
use crate::repo::schema::ensure_table_ready;
use log::debug;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    id,
    uid,
    username,
    email,
    admin,
    status,
    created_at
FROM users";

// Stays well below SQLITE_MAX_VARIABLE_NUMBER on every bundled build.
const ID_CHUNK_SIZE: usize = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by user, entry and deprecation log storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    Db(DbError),
    NotFound {
        entity: &'static str,
        id: i64,
    },
    /// Caller-supplied value rejected before touching storage.
    InvalidInput(String),
    /// A user's content cannot be transferred to that same user.
    SelfTransfer(UserId),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::SelfTransfer(id) => {
                write!(f, "cannot transfer content of user {id} to itself")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for user storage.
pub trait UserRepository {
    /// Inserts one user and returns the stored record.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    /// Loads one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Resolves ids to users in caller order.
    ///
    /// Unknown ids are dropped and repeated ids collapse to the first hit.
    fn find_users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>>;
    /// Lists all users ordered by id.
    fn list_users(&self) -> RepoResult<Vec<User>>;
    /// Ids of every admin account, ascending.
    fn admin_user_ids(&self) -> RepoResult<Vec<UserId>>;
    /// Replaces the lifecycle status of one user.
    fn set_user_status(&self, id: UserId, status: UserStatus) -> RepoResult<()>;
    /// Deletes one user, moving its content to `transfer_content_to` when
    /// given and removing it otherwise.
    fn delete_user(&self, user: &User, transfer_content_to: Option<&User>) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "users",
            &["id", "uid", "username", "email", "admin", "status", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (uid, username, email, admin, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                user.uid.to_string(),
                user.username.as_str(),
                user.email.as_str(),
                bool_to_int(user.admin),
                user.status.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?
            .ok_or(RepoError::NotFound { entity: "user", id })
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_users_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        let mut found: HashMap<UserId, User> = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "{USER_SELECT_SQL} WHERE id IN ({placeholders});"
            ))?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                let user = parse_user_row(row)?;
                found.insert(user.id, user);
            }
        }

        let mut seen = HashSet::with_capacity(found.len());
        let users = ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| found.remove(id))
            .collect();
        Ok(users)
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn admin_user_ids(&self) -> RepoResult<Vec<UserId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM users WHERE admin = 1 ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn set_user_status(&self, id: UserId, status: UserStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users SET status = ?2 WHERE id = ?1;",
            params![id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn delete_user(&self, user: &User, transfer_content_to: Option<&User>) -> RepoResult<()> {
        if transfer_content_to.is_some_and(|target| target.id == user.id) {
            return Err(RepoError::SelfTransfer(user.id));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let entries_affected = match transfer_content_to {
            Some(target) => tx.execute(
                "UPDATE entries
                 SET
                    author_id = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE author_id = ?1;",
                params![user.id, target.id],
            )?,
            None => tx.execute("DELETE FROM entries WHERE author_id = ?1;", [user.id])?,
        };

        let changed = tx.execute("DELETE FROM users WHERE id = ?1;", [user.id])?;
        if changed == 0 {
            // Dropping `tx` rolls the entry changes back.
            return Err(RepoError::NotFound {
                entity: "user",
                id: user.id,
            });
        }
        tx.commit()?;

        debug!(
            "event=user_delete module=repo status=ok user_id={} transfer_to={} entries={}",
            user.id,
            transfer_content_to.map_or_else(|| "none".to_string(), |target| target.id.to_string()),
            entries_affected
        );
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uid_text: String = row.get("uid")?;
    let uid = Uuid::parse_str(&uid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uid_text}` in users.uid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = UserStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in users.status"))
    })?;

    let admin = match row.get::<_, i64>("admin")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid admin value `{other}` in users.admin"
            )));
        }
    };

    let user = User {
        id: row.get("id")?,
        uid,
        username: row.get("username")?,
        email: row.get("email")?,
        admin,
        status,
        created_at: row.get("created_at")?,
    };
    user.validate()?;
    Ok(user)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
