//! Deprecation warning recorder.
//!
//! # Responsibility
//! - Persist deprecation warnings through a `DeprecationLogStore`.
//! - Remember which warnings the current request produced.
//!
//! # Invariants
//! - Request logs keep first-hit order and hold each log id once.
//! - `delete_all_logs` empties both the store and the request buffer.

use crate::model::deprecation::{DeprecationLog, DeprecationLogId, NewDeprecationLog};
use crate::repo::deprecation_repo::DeprecationLogStore;
use crate::repo::user_repo::RepoResult;
use log::{info, warn};

/// Request-scoped deprecation recorder over a persistent store.
pub struct Deprecator<S: DeprecationLogStore> {
    store: S,
    request_logs: Vec<DeprecationLog>,
}

impl<S: DeprecationLogStore> Deprecator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            request_logs: Vec::new(),
        }
    }

    /// Records one deprecation hit and returns the stored log.
    pub fn log(&mut self, entry: &NewDeprecationLog) -> RepoResult<DeprecationLog> {
        let stored = self.store.upsert_log(entry)?;
        warn!(
            "event=deprecation_logged module=deprecator status=ok log_id={} key={}",
            stored.id, stored.key
        );

        match self
            .request_logs
            .iter_mut()
            .find(|existing| existing.id == stored.id)
        {
            Some(existing) => *existing = stored.clone(),
            None => self.request_logs.push(stored.clone()),
        }
        Ok(stored)
    }

    /// Logs recorded during the current request.
    pub fn request_logs(&self) -> &[DeprecationLog] {
        &self.request_logs
    }

    pub fn get_log_by_id(&self, id: DeprecationLogId) -> RepoResult<Option<DeprecationLog>> {
        self.store.get_log(id)
    }

    /// Every persisted log, most recent first.
    pub fn all_logs(&self) -> RepoResult<Vec<DeprecationLog>> {
        self.store.list_logs()
    }

    /// Deletes all persisted logs. Clearing an empty store is a no-op.
    pub fn delete_all_logs(&mut self) -> RepoResult<usize> {
        let removed = self.store.delete_all_logs()?;
        self.request_logs.clear();
        info!("event=deprecation_clear module=deprecator status=ok removed={removed}");
        Ok(removed)
    }
}
