//! Caller identity seam for privilege-sensitive actions.

use crate::model::user::{User, UserId};

/// Who is performing the current request.
pub trait CallerContext {
    fn caller_id(&self) -> UserId;
    /// Whether the caller holds admin privileges.
    fn caller_is_admin(&self) -> bool;
}

/// Plain caller snapshot, typically built from the signed-in session user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub fn new(id: UserId, is_admin: bool) -> Self {
        Self { id, is_admin }
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.admin)
    }
}

impl CallerContext for Caller {
    fn caller_id(&self) -> UserId {
        self.id
    }

    fn caller_is_admin(&self) -> bool {
        self.is_admin
    }
}

impl<C: CallerContext + ?Sized> CallerContext for &C {
    fn caller_id(&self) -> UserId {
        (**self).caller_id()
    }

    fn caller_is_admin(&self) -> bool {
        (**self).caller_is_admin()
    }
}
