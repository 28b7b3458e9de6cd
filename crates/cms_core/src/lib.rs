//! Core domain logic for the CMS: users and their content, the batch
//! delete-users action, and the deprecation log with its debug panel.

pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

use std::error::Error;
use std::fmt::{Display, Formatter};

pub use config::{ConfigError, CoreConfig, DatabaseConfig, LoggingConfig};
pub use event::{UserActivateEvent, UserEventListener, UserEvents};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::deprecation::{DeprecationLog, DeprecationLogId, NewDeprecationLog, TraceFrame};
pub use model::entry::{Entry, EntryId};
pub use model::user::{NewUser, User, UserId, UserStatus, UserValidationError};
pub use repo::deprecation_repo::{DeprecationLogStore, SqliteDeprecationLogStore};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::access::{Caller, CallerContext};
pub use service::delete_users::{
    normalize_transfer_target, ActionResponse, DeleteUsersAction, DeleteUsersError,
    DeleteUsersReport, TransferContentTo, TransferTargetValue, UserDeletionResult,
    UserDeletionStatus,
};
pub use service::deprecated_panel::{DeprecatedPanel, PanelDetail, PanelError, PanelQuery};
pub use service::deprecator::Deprecator;
pub use service::user_service::{UserService, UserServiceError};

/// Failure while bringing the core up from configuration.
#[derive(Debug)]
pub enum BootstrapError {
    Logging(LoggingError),
    Db(db::DbError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for BootstrapError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<db::DbError> for BootstrapError {
    fn from(value: db::DbError) -> Self {
        Self::Db(value)
    }
}

/// Starts logging and opens the migrated database described by `config`.
pub fn bootstrap(config: &CoreConfig) -> Result<rusqlite::Connection, BootstrapError> {
    init_logging(config.logging.level, &config.logging.dir)?;
    let conn = db::open_db_with_options(&config.database.path, &config.database.options())?;
    Ok(conn)
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
