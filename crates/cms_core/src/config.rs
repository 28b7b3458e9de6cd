//! TOML configuration for the CMS core.
//!
//! # Responsibility
//! - Describe database and logging settings in one document.
//! - Reject unusable settings before any resource is opened.
//!
//! # Invariants
//! - `database.path` is non-empty.
//! - `logging.dir` is absolute.

use crate::db::DbOptions;
use crate::logging::LogLevel;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// `[database]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Connection options for `open_db_with_options`.
    pub fn options(&self) -> DbOptions {
        DbOptions {
            busy_timeout_ms: self.busy_timeout_ms,
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    DbOptions::default().busy_timeout_ms
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    pub dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database.path must not be empty".to_string(),
            ));
        }
        if !self.logging.dir.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "logging.dir must be an absolute path, got `{}`",
                self.logging.dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::logging::LogLevel;

    #[test]
    fn parses_full_document() {
        let config = CoreConfig::from_toml_str(
            r#"
            [database]
            path = "/var/lib/cms/cms.sqlite3"
            busy_timeout_ms = 250

            [logging]
            level = "WARN"
            dir = "/var/log/cms"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.options().busy_timeout_ms, 250);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn fills_defaults_for_optional_keys() {
        let config = CoreConfig::from_toml_str(
            r#"
            [database]
            path = "cms.sqlite3"

            [logging]
            dir = "/tmp/cms-logs"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.logging.level, LogLevel::default_for_build());
    }

    #[test]
    fn rejects_relative_log_dir_and_unknown_level() {
        let relative = CoreConfig::from_toml_str(
            "[database]\npath = \"cms.db\"\n[logging]\ndir = \"logs\"\n",
        )
        .unwrap_err();
        assert!(matches!(relative, ConfigError::Invalid(_)));

        let level = CoreConfig::from_toml_str(
            "[database]\npath = \"cms.db\"\n[logging]\nlevel = \"loud\"\ndir = \"/tmp\"\n",
        )
        .unwrap_err();
        assert!(matches!(level, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_misspelled_database_key() {
        let err = CoreConfig::from_toml_str(
            "[database]\npath = \"cms.db\"\nbusy_timout_ms = 10\n[logging]\ndir = \"/tmp\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("busy_timout_ms"));
    }
}
