//! User lifecycle events.
//!
//! # Responsibility
//! - Carry user state to listeners around lifecycle changes.
//! - Let `before_*` listeners cancel the change.
//!
//! # Invariants
//! - Listeners run in registration order.
//! - Once cancelled, an event stays cancelled for later listeners.

use crate::model::user::User;
use std::sync::Arc;

/// Cancelable event fired before a user is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivateEvent {
    /// The user about to be activated.
    pub user: User,
    is_valid: bool,
}

impl UserActivateEvent {
    pub fn new(user: User) -> Self {
        Self {
            user,
            is_valid: true,
        }
    }

    /// Stops the activation.
    pub fn cancel(&mut self) {
        self.is_valid = false;
    }

    /// Whether the activation may proceed.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

/// Listener hooks for user lifecycle changes.
pub trait UserEventListener: Send + Sync {
    fn before_activate_user(&self, _event: &mut UserActivateEvent) {}
    fn after_activate_user(&self, _user: &User) {}
}

/// Ordered listener registry.
#[derive(Default, Clone)]
pub struct UserEvents {
    listeners: Vec<Arc<dyn UserEventListener>>,
}

impl UserEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn UserEventListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Runs `before_activate_user` hooks; returns whether the event survived.
    pub fn trigger_before_activate(&self, event: &mut UserActivateEvent) -> bool {
        for listener in &self.listeners {
            listener.before_activate_user(event);
        }
        event.is_valid()
    }

    pub fn trigger_after_activate(&self, user: &User) {
        for listener in &self.listeners {
            listener.after_activate_user(user);
        }
    }
}
