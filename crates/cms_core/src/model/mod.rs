//! Domain model for users, their content and deprecation warnings.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//!
//! # Invariants
//! - Users and entries are identified by storage-assigned integer ids.
//! - Every entry is owned by exactly one existing user.

pub mod deprecation;
pub mod entry;
pub mod user;
