use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::user::{User, UserStats};

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        Self {
            id: value.id.get(),
            email: value.email.into_inner(),
            login: value.login.into_inner(),
            full_name: value.full_name,
            bio: value.bio,
            avatar_url: value.avatar_url.map(|url| url.into_inner()),
            is_active: value.is_active,
            is_admin: value.is_admin,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithStatsDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

impl UserWithStatsDto {
    pub fn new(user: User, stats: UserStats) -> Self {
        Self {
            user: user.into(),
            posts_count: stats.posts_count,
            followers_count: stats.followers_count,
            following_count: stats.following_count,
        }
    }
}
