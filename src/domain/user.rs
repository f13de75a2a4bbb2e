use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{AvatarUrl, Email, Login, PasswordHash, UserId};

/// Registered account. Owns posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub login: Login,
    pub password_hash: PasswordHash,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<AvatarUrl>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub login: Login,
    pub password_hash: PasswordHash,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<AvatarUrl>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial update of a [`User`]. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub email: Option<Email>,
    pub login: Option<Login>,
    pub password_hash: Option<PasswordHash>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<AvatarUrl>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    /// Returns `true` when the update would touch administrative flags.
    pub fn touches_admin_flags(&self) -> bool {
        self.is_active.is_some() || self.is_admin.is_some()
    }
}

/// Counts derived at read time for a single user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}
