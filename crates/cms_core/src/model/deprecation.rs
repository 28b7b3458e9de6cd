//! Deprecation warning log model.
//!
//! # Invariants
//! - `(key, fingerprint)` identifies one warning; repeats update the same log.
//! - `fingerprint` is `file:line` when a call site is known, otherwise `key`.

use serde::{Deserialize, Serialize};

/// Storage-assigned deprecation log identifier.
pub type DeprecationLogId = i64;

/// One stack frame captured when a deprecation was hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceFrame {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
}

/// Persisted deprecation warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecationLog {
    pub id: DeprecationLogId,
    /// What was deprecated, e.g. `craft.users.deleteUser`.
    pub key: String,
    pub fingerprint: String,
    /// Unix epoch milliseconds of the most recent hit.
    pub last_occurrence: i64,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub message: String,
    pub traces: Vec<TraceFrame>,
}

/// Input for recording a deprecation warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeprecationLog {
    pub key: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub traces: Vec<TraceFrame>,
}

impl NewDeprecationLog {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            file: None,
            line: None,
            traces: Vec::new(),
        }
    }

    /// Attaches the call site that triggered the warning.
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn with_traces(mut self, traces: Vec<TraceFrame>) -> Self {
        self.traces = traces;
        self
    }

    /// Dedup key for repeated hits of the same warning.
    pub fn fingerprint(&self) -> String {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.clone(),
            _ => self.key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NewDeprecationLog;

    #[test]
    fn fingerprint_prefers_call_site() {
        let located = NewDeprecationLog::new("old.api", "use new.api").at("index.twig", 12);
        assert_eq!(located.fingerprint(), "index.twig:12");

        let bare = NewDeprecationLog::new("old.api", "use new.api");
        assert_eq!(bare.fingerprint(), "old.api");
    }
}
