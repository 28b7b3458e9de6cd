//! User use-case service.
//!
//! # Responsibility
//! - Provide user creation/lookup entry points over a `UserRepository`.
//! - Activate accounts, giving event listeners a chance to veto.
//!
//! # Invariants
//! - A cancelled activation performs no write.
//! - Activating an already active user is a no-op and fires no events.

use crate::event::{UserActivateEvent, UserEvents};
use crate::model::user::{NewUser, User, UserId, UserStatus};
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    UserNotFound(UserId),
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::UserNotFound(_) => None,
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "user",
                id,
            } => Self::UserNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        self.repo.create_user(user)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }

    /// Activates one user.
    ///
    /// Returns `Ok(false)` when a listener cancelled the activation.
    pub fn activate_user(&self, id: UserId, events: &UserEvents) -> Result<bool, UserServiceError> {
        let user = self
            .repo
            .get_user(id)?
            .ok_or(UserServiceError::UserNotFound(id))?;
        if user.is_active() {
            return Ok(true);
        }

        let mut event = UserActivateEvent::new(user);
        if !events.trigger_before_activate(&mut event) {
            info!("event=user_activate module=service status=cancelled user_id={id}");
            return Ok(false);
        }

        self.repo.set_user_status(id, UserStatus::Active)?;
        let mut activated = event.user;
        activated.status = UserStatus::Active;
        events.trigger_after_activate(&activated);

        info!("event=user_activate module=service status=ok user_id={id}");
        Ok(true)
    }
}
