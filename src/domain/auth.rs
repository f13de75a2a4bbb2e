//! Acting identity threaded through every service call.

use serde::{Deserialize, Serialize};

use crate::domain::types::UserId;
use crate::domain::user::User;

/// Resolved caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No credential was presented.
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
}

/// Snapshot of the caller taken when the credential was resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub is_admin: bool,
    pub is_active: bool,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            is_admin: user.is_admin,
            is_active: user.is_active,
        }
    }
}

impl Identity {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(|user| user.is_admin)
    }

    /// Whether the caller owns a resource authored by `owner` or is an admin.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.user()
            .is_some_and(|user| user.is_admin || user.id == owner)
    }
}
