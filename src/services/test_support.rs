//! Fixtures shared by service tests.

use std::sync::OnceLock;

use chrono::Utc;

use crate::domain::auth::{AuthenticatedUser, Identity};
use crate::domain::post::{NewPost, PostDetails};
use crate::domain::types::{Email, Login, PasswordHash, PostContent, PostTitle};
use crate::domain::user::{NewUser, User};
use crate::repository::{MemoryRepository, PostWriter, UserWriter};

/// Hash of `password123`, computed once per test binary.
fn default_password_hash() -> PasswordHash {
    static HASH: OnceLock<PasswordHash> = OnceLock::new();
    HASH.get_or_init(|| crate::auth::hash_password("password123").unwrap())
        .clone()
}

pub fn seed_user(repo: &MemoryRepository, login: &str, is_admin: bool) -> User {
    let now = Utc::now().naive_utc();
    repo.create_user(&NewUser {
        email: Email::new(format!("{login}@example.com")).unwrap(),
        login: Login::new(login).unwrap(),
        password_hash: default_password_hash(),
        full_name: None,
        bio: None,
        avatar_url: None,
        is_active: true,
        is_admin,
        created_at: now,
        updated_at: now,
    })
    .unwrap()
}

pub fn seed_post(
    repo: &MemoryRepository,
    author: &User,
    title: &str,
    is_published: bool,
) -> PostDetails {
    repo.create_post(&NewPost {
        author_id: author.id,
        title: PostTitle::new(title).unwrap(),
        content: PostContent::new(format!("{title} body")).unwrap(),
        summary: None,
        is_published,
        category_ids: vec![],
        created_at: Utc::now().naive_utc(),
    })
    .unwrap()
}

pub fn identity_of(user: &User) -> Identity {
    Identity::Authenticated(AuthenticatedUser::from(user))
}
