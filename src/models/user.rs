use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{AvatarUrl, Email, Login, PasswordHash, TypeConstraintError};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser, UserUpdate};

/// Diesel model representing a row in the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`User`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub login: &'a str,
    pub password_hash: &'a str,
    pub full_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset applied by partial updates. `None` columns are skipped.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub login: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: user.id.try_into()?,
            email: Email::new(user.email)?,
            login: Login::new(user.login)?,
            password_hash: PasswordHash::new(user.password_hash)?,
            full_name: user.full_name,
            bio: user.bio,
            avatar_url: user.avatar_url.map(AvatarUrl::new).transpose()?,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            email: user.email.as_str(),
            login: user.login.as_str(),
            password_hash: user.password_hash.as_str(),
            full_name: user.full_name.as_deref(),
            bio: user.bio.as_deref(),
            avatar_url: user.avatar_url.as_ref().map(AvatarUrl::as_str),
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl<'a> UserChangeset<'a> {
    pub fn new(update: &'a UserUpdate, updated_at: NaiveDateTime) -> Self {
        Self {
            email: update.email.as_ref().map(Email::as_str),
            login: update.login.as_ref().map(Login::as_str),
            password_hash: update.password_hash.as_ref().map(PasswordHash::as_str),
            full_name: update.full_name.as_deref(),
            bio: update.bio.as_deref(),
            avatar_url: update.avatar_url.as_ref().map(AvatarUrl::as_str),
            is_active: update.is_active,
            is_admin: update.is_admin,
            updated_at,
        }
    }
}
