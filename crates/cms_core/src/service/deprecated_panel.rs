//! Debug panel facade over the deprecation log.
//!
//! Read-mostly view used by the debug toolbar: a summary of the current
//! request's warnings, a per-log trace detail, and a clear command.

use crate::model::deprecation::{DeprecationLog, DeprecationLogId};
use crate::repo::deprecation_repo::DeprecationLogStore;
use crate::repo::user_repo::RepoError;
use crate::service::deprecator::Deprecator;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from deprecation panel operations.
#[derive(Debug)]
pub enum PanelError {
    /// No deprecation log matches the requested id.
    NotFound(String),
    Repo(RepoError),
}

impl Display for PanelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(
                f,
                "the requested deprecation error log could not be found: {id}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PanelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for PanelError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Query parameters accepted by the panel detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelQuery {
    /// Clear all logs before rendering.
    pub clear: bool,
    /// Raw `trace` parameter selecting one log.
    pub trace: Option<String>,
}

/// What the detail view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelDetail {
    /// All persisted logs.
    Overview(Vec<DeprecationLog>),
    /// Stack traces of one log.
    Traces(DeprecationLog),
}

/// Deprecation panel bound to one request's deprecator.
pub struct DeprecatedPanel<'a, S: DeprecationLogStore> {
    deprecator: &'a mut Deprecator<S>,
}

impl<'a, S: DeprecationLogStore> DeprecatedPanel<'a, S> {
    pub fn new(deprecator: &'a mut Deprecator<S>) -> Self {
        Self { deprecator }
    }

    pub fn name(&self) -> &'static str {
        "Deprecated"
    }

    /// Iterates the current request's logs. Call again to restart.
    pub fn list_summary(&self) -> std::slice::Iter<'_, DeprecationLog> {
        self.deprecator.request_logs().iter()
    }

    pub fn get_detail_by_id(&self, id: DeprecationLogId) -> Result<DeprecationLog, PanelError> {
        self.deprecator
            .get_log_by_id(id)?
            .ok_or_else(|| PanelError::NotFound(id.to_string()))
    }

    /// Empties the log store. Safe to call on an empty store.
    pub fn clear_all(&mut self) -> Result<(), PanelError> {
        self.deprecator.delete_all_logs()?;
        Ok(())
    }

    /// Resolves the detail view for one panel request.
    ///
    /// `clear` runs first, so `clear` together with `trace` reports the
    /// trace as not found. A blank or `0` trace renders the overview.
    pub fn detail(&mut self, query: &PanelQuery) -> Result<PanelDetail, PanelError> {
        if query.clear {
            self.clear_all()?;
        }

        match query.trace.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() && raw != "0" => {
                let id = raw
                    .parse::<DeprecationLogId>()
                    .map_err(|_| PanelError::NotFound(raw.to_string()))?;
                self.get_detail_by_id(id).map(PanelDetail::Traces)
            }
            _ => Ok(PanelDetail::Overview(self.deprecator.all_logs()?)),
        }
    }

    /// Snapshot of the request's logs stored with the debug record.
    pub fn save(&self) -> Vec<DeprecationLog> {
        self.list_summary().cloned().collect()
    }
}
