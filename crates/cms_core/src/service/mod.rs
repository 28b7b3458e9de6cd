//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Take every collaborator (repository, caller, store) as an explicit
//!   constructor argument.

pub mod access;
pub mod delete_users;
pub mod deprecated_panel;
pub mod deprecator;
pub mod user_service;
