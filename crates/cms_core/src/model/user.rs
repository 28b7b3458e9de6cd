//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record that owns content entries.
//! - Validate user fields before they reach storage.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `uid` is stable across imports and never reused for another user.
//! - `admin` is the privilege flag consulted by destructive actions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-@]+$").expect("valid username regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

const USERNAME_MAX_CHARS: usize = 100;

/// Storage-assigned user identifier.
pub type UserId = i64;

/// Account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Registered but not yet activated.
    Pending,
    /// Able to sign in.
    Active,
    /// Locked out by an administrator.
    Suspended,
}

impl UserStatus {
    /// Stable storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Parses a storage value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Stable external identity used by project config and sync.
    pub uid: Uuid,
    pub username: String,
    pub email: String,
    /// Privileged account; only other admins may delete it.
    pub admin: bool,
    pub status: UserStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Returns whether the account can sign in.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Validates persisted fields.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_fields(&self.username, &self.email)
    }
}

/// Input for user creation. Storage assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub uid: Uuid,
    pub username: String,
    pub email: String,
    pub admin: bool,
    pub status: UserStatus,
}

impl NewUser {
    /// Creates a pending, non-admin user with a generated `uid`.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            admin: false,
            status: UserStatus::Pending,
        }
    }

    /// Marks the new user as an admin.
    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    /// Overrides the initial status.
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_fields(&self.username, &self.email)
    }
}

/// Field-level user validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    BlankUsername,
    UsernameTooLong(usize),
    InvalidUsername(String),
    InvalidEmail(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "username must not be blank"),
            Self::UsernameTooLong(len) => write!(
                f,
                "username is {len} characters, maximum is {USERNAME_MAX_CHARS}"
            ),
            Self::InvalidUsername(value) => write!(f, "username contains invalid characters: `{value}`"),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
        }
    }
}

impl Error for UserValidationError {}

fn validate_fields(username: &str, email: &str) -> Result<(), UserValidationError> {
    if username.trim().is_empty() {
        return Err(UserValidationError::BlankUsername);
    }
    let len = username.chars().count();
    if len > USERNAME_MAX_CHARS {
        return Err(UserValidationError::UsernameTooLong(len));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(UserValidationError::InvalidUsername(username.to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}
