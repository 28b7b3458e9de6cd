//! Content entry model.
//!
//! Every entry has exactly one author. Deleting the author either moves the
//! entry to another user or removes it together with the author.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Storage-assigned entry identifier.
pub type EntryId = i64;

/// Persisted content record owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub author_id: UserId,
    pub title: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Bumped when ownership moves.
    pub updated_at: i64,
}
