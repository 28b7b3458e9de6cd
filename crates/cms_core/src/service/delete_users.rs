//! Batch "delete users" element action.
//!
//! # Responsibility
//! - Decide which selected users the caller may delete.
//! - Validate the optional content-transfer target before any mutation.
//! - Delete the remaining users in selection order, reporting each outcome.
//!
//! # Invariants
//! - Non-admin callers never delete admin accounts.
//! - Admin callers never delete their own account through this action.
//! - An unresolvable, malformed or in-batch transfer target aborts the whole
//!   action before the first delete.
//! - Deletion stops at the first storage failure; earlier deletes stay
//!   committed and are listed in the error's report.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};
use crate::service::access::CallerContext;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const SUCCESS_MESSAGE: &str = "Users deleted.";

/// One transfer target value as posted by the delete-user modal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransferTargetValue {
    Id(UserId),
    Text(String),
}

/// Raw `transferContentTo` parameter: a bare value or an element-select list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TransferContentTo {
    One(TransferTargetValue),
    Many(Vec<TransferTargetValue>),
}

impl TransferContentTo {
    pub fn id(id: UserId) -> Self {
        Self::One(TransferTargetValue::Id(id))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::One(TransferTargetValue::Text(value.into()))
    }
}

/// What happened to one selected user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserDeletionStatus {
    Deleted,
    /// Protected from this caller; left untouched.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDeletionResult {
    pub user_id: UserId,
    #[serde(flatten)]
    pub status: UserDeletionStatus,
}

/// Per-user outcome of one action run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteUsersReport {
    pub results: Vec<UserDeletionResult>,
    /// User that received the deleted users' content.
    pub transfer_target: Option<UserId>,
}

impl DeleteUsersReport {
    pub fn deleted_ids(&self) -> Vec<UserId> {
        self.ids_where(|status| matches!(status, UserDeletionStatus::Deleted))
    }

    pub fn skipped_ids(&self) -> Vec<UserId> {
        self.ids_where(|status| matches!(status, UserDeletionStatus::Skipped))
    }

    /// Aggregate message shown to the user.
    pub fn message(&self) -> &'static str {
        SUCCESS_MESSAGE
    }

    fn ids_where(&self, predicate: impl Fn(&UserDeletionStatus) -> bool) -> Vec<UserId> {
        self.results
            .iter()
            .filter(|result| predicate(&result.status))
            .map(|result| result.user_id)
            .collect()
    }
}

/// Framework-facing action result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// Errors from the delete users action.
#[derive(Debug)]
pub enum DeleteUsersError {
    /// The transfer parameter listed more than one user.
    MalformedTransferTarget { count: usize },
    /// The transfer target does not resolve to a user.
    UnknownTransferTarget(String),
    /// The transfer target is itself selected for deletion.
    TransferTargetInBatch(UserId),
    /// A delete failed; `report` covers everything processed so far,
    /// ending with the failed user.
    DeletionFailed {
        user_id: UserId,
        report: DeleteUsersReport,
        source: RepoError,
    },
    /// Lookup failure before any deletion.
    Repo(RepoError),
}

impl Display for DeleteUsersError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTransferTarget { count } => write!(
                f,
                "content can only be transferred to one user, got {count}"
            ),
            Self::UnknownTransferTarget(id) => write!(f, "No user exists with the ID \"{id}\"."),
            Self::TransferTargetInBatch(id) => write!(
                f,
                "user {id} cannot receive transferred content while being deleted"
            ),
            Self::DeletionFailed {
                user_id, source, ..
            } => write!(f, "failed to delete user {user_id}: {source}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeleteUsersError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DeletionFailed { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DeleteUsersError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Normalizes the raw transfer parameter into at most one user id.
///
/// Empty values (`""`, `0`, `[]`) mean "no transfer". A single-element list
/// is unwrapped; longer lists are rejected.
pub fn normalize_transfer_target(
    raw: Option<&TransferContentTo>,
) -> Result<Option<UserId>, DeleteUsersError> {
    let value = match raw {
        None => return Ok(None),
        Some(TransferContentTo::One(value)) => value,
        Some(TransferContentTo::Many(values)) => match values.as_slice() {
            [] => return Ok(None),
            [value] => value,
            _ => {
                return Err(DeleteUsersError::MalformedTransferTarget {
                    count: values.len(),
                })
            }
        },
    };

    match value {
        TransferTargetValue::Id(0) => Ok(None),
        TransferTargetValue::Id(id) => Ok(Some(*id)),
        TransferTargetValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "0" {
                return Ok(None);
            }
            trimmed
                .parse::<UserId>()
                .map(Some)
                .map_err(|_| DeleteUsersError::UnknownTransferTarget(trimmed.to_string()))
        }
    }
}

/// Deletes selected users on behalf of one caller.
pub struct DeleteUsersAction<R: UserRepository, C: CallerContext> {
    repo: R,
    caller: C,
}

impl<R: UserRepository, C: CallerContext> DeleteUsersAction<R, C> {
    pub fn new(repo: R, caller: C) -> Self {
        Self { repo, caller }
    }

    /// Menu label for the action trigger.
    pub fn name(&self) -> &'static str {
        "Delete…"
    }

    pub fn is_destructive(&self) -> bool {
        true
    }

    /// Users this caller may not delete.
    ///
    /// - Non-admin caller: every admin account.
    /// - Admin caller: the caller's own account.
    pub fn undeletable_user_ids(&self) -> RepoResult<BTreeSet<UserId>> {
        if self.caller.caller_is_admin() {
            Ok(BTreeSet::from([self.caller.caller_id()]))
        } else {
            Ok(self.repo.admin_user_ids()?.into_iter().collect())
        }
    }

    /// Returns `false` when the selection contains any undeletable user.
    pub fn validate_selection(&self, selected: &[UserId]) -> RepoResult<bool> {
        let undeletable = self.undeletable_user_ids()?;
        Ok(!selected.iter().any(|id| undeletable.contains(id)))
    }

    /// Runs the action and reports the outcome for every resolved candidate.
    ///
    /// # Contract
    /// - Candidates are processed in the given order; unknown ids are ignored.
    /// - No user is deleted unless the transfer target validates.
    pub fn delete_users(
        &self,
        candidates: &[UserId],
        transfer_content_to: Option<&TransferContentTo>,
    ) -> Result<DeleteUsersReport, DeleteUsersError> {
        let started_at = Instant::now();
        info!(
            "event=users_delete module=service status=start candidates={} caller_id={} caller_admin={}",
            candidates.len(),
            self.caller.caller_id(),
            self.caller.caller_is_admin()
        );

        let undeletable = self.undeletable_user_ids()?;
        let transfer_target = self.resolve_transfer_target(transfer_content_to)?;
        let users = self.repo.find_users_by_ids(candidates)?;

        if let Some(target) = transfer_target.as_ref() {
            let target_selected = users
                .iter()
                .any(|user| user.id == target.id && !undeletable.contains(&user.id));
            if target_selected {
                warn!(
                    "event=users_delete module=service status=error error_code=transfer_target_in_batch target_id={}",
                    target.id
                );
                return Err(DeleteUsersError::TransferTargetInBatch(target.id));
            }
        }

        let mut report = DeleteUsersReport {
            results: Vec::with_capacity(users.len()),
            transfer_target: transfer_target.as_ref().map(|target| target.id),
        };

        for user in &users {
            if undeletable.contains(&user.id) {
                report.results.push(UserDeletionResult {
                    user_id: user.id,
                    status: UserDeletionStatus::Skipped,
                });
                continue;
            }

            if let Err(err) = self.repo.delete_user(user, transfer_target.as_ref()) {
                error!(
                    "event=users_delete module=service status=error error_code=delete_failed user_id={} duration_ms={} error={}",
                    user.id,
                    started_at.elapsed().as_millis(),
                    err
                );
                report.results.push(UserDeletionResult {
                    user_id: user.id,
                    status: UserDeletionStatus::Failed {
                        reason: err.to_string(),
                    },
                });
                return Err(DeleteUsersError::DeletionFailed {
                    user_id: user.id,
                    report,
                    source: err,
                });
            }

            report.results.push(UserDeletionResult {
                user_id: user.id,
                status: UserDeletionStatus::Deleted,
            });
        }

        info!(
            "event=users_delete module=service status=ok deleted={} skipped={} duration_ms={}",
            report.deleted_ids().len(),
            report.skipped_ids().len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Runs the action and folds the outcome into one success/failure message.
    pub fn perform_action(
        &self,
        candidates: &[UserId],
        transfer_content_to: Option<&TransferContentTo>,
    ) -> ActionResponse {
        match self.delete_users(candidates, transfer_content_to) {
            Ok(report) => ActionResponse {
                success: true,
                message: report.message().to_string(),
            },
            Err(err) => ActionResponse {
                success: false,
                message: err.to_string(),
            },
        }
    }

    fn resolve_transfer_target(
        &self,
        raw: Option<&TransferContentTo>,
    ) -> Result<Option<User>, DeleteUsersError> {
        let target_id = match normalize_transfer_target(raw) {
            Ok(Some(id)) => id,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(
                    "event=users_delete module=service status=error error_code=invalid_transfer_target error={}",
                    err
                );
                return Err(err);
            }
        };

        match self.repo.get_user(target_id)? {
            Some(user) => Ok(Some(user)),
            None => {
                warn!(
                    "event=users_delete module=service status=error error_code=unknown_transfer_target target_id={}",
                    target_id
                );
                Err(DeleteUsersError::UnknownTransferTarget(
                    target_id.to_string(),
                ))
            }
        }
    }
}
