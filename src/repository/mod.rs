use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::comment::{Comment, CommentDetails, NewComment};
use crate::domain::post::{NewPost, PostDetails, PostOrderBy, PostStats, PostUpdate, SortOrder};
use crate::domain::social::{FavoriteOutcome, FollowOutcome};
use crate::domain::stats::SiteTotals;
use crate::domain::types::{CategoryId, CommentContent, CommentId, Email, Login, PostId, UserId};
use crate::domain::user::{NewUser, User, UserStats, UserUpdate};
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;

pub mod category;
pub mod comment;
pub mod errors;
pub mod memory;
pub mod post;
pub mod social;
pub mod stats;
pub mod user;

pub use memory::MemoryRepository;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing or searching users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Case-insensitive substring matched against login, email and full name.
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters used when listing, searching or building feeds of posts.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    /// Hide drafts.
    pub published_only: bool,
    pub author_id: Option<UserId>,
    /// Restrict to posts written by any of these authors.
    pub author_ids: Option<Vec<UserId>>,
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring matched against title, content and summary.
    pub search: Option<String>,
    pub order_by: PostOrderBy,
    pub order: SortOrder,
    pub pagination: Option<Pagination>,
}

impl PostListQuery {
    pub fn published(mut self) -> Self {
        self.published_only = true;
        self
    }
    pub fn author(mut self, author_id: UserId) -> Self {
        self.author_id = Some(author_id);
        self
    }
    pub fn authors(mut self, author_ids: Vec<UserId>) -> Self {
        self.author_ids = Some(author_ids);
        self
    }
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn order(mut self, order_by: PostOrderBy, order: SortOrder) -> Self {
        self.order_by = order_by;
        self.order = order;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing comments.
#[derive(Debug, Clone, Default)]
pub struct CommentListQuery {
    pub post_id: Option<PostId>,
    pub user_id: Option<UserId>,
    pub pagination: Option<Pagination>,
}

impl CommentListQuery {
    pub fn post(mut self, post_id: PostId) -> Self {
        self.post_id = Some(post_id);
        self
    }
    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters for listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    /// Substring matched against name, slug and description.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CategoryListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Read-only operations for user entities.
pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>>;
    fn get_user_by_login(&self, login: &Login) -> RepositoryResult<Option<User>>;
    /// List users matching the query, newest first, with the unpaginated total.
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    /// Count the user's posts, followers and followed users.
    fn get_user_stats(&self, id: UserId) -> RepositoryResult<UserStats>;
}

/// Write operations for user entities.
pub trait UserWriter {
    /// Insert a user. Fails with `Duplicate("email" | "login")` on collisions.
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, id: UserId, update: &UserUpdate) -> RepositoryResult<User>;
    /// Delete a user together with everything they own.
    fn delete_user(&self, id: UserId) -> RepositoryResult<bool>;
}

/// Read-only operations for posts.
pub trait PostReader {
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostDetails>)>;
    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<PostDetails>>;
    fn get_post_by_slug(&self, slug: &str) -> RepositoryResult<Option<PostDetails>>;
    fn get_post_stats(&self, id: PostId) -> RepositoryResult<PostStats>;
}

/// Write operations for posts and their category links.
pub trait PostWriter {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<PostDetails>;
    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<PostDetails>;
    fn delete_post(&self, id: PostId) -> RepositoryResult<bool>;
    fn increment_post_views(&self, id: PostId) -> RepositoryResult<usize>;
}

/// Read-only operations for categories.
pub trait CategoryReader {
    fn list_categories(&self, query: CategoryListQuery)
    -> RepositoryResult<(usize, Vec<Category>)>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
}

/// Write operations for categories.
pub trait CategoryWriter {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category>;
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool>;
}

/// Read-only operations for comments.
pub trait CommentReader {
    fn list_comments(
        &self,
        query: CommentListQuery,
    ) -> RepositoryResult<(usize, Vec<CommentDetails>)>;
    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>>;
}

/// Write operations for comments.
pub trait CommentWriter {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<CommentDetails>;
    /// Replace the content and mark the comment as edited.
    fn update_comment(
        &self,
        id: CommentId,
        content: &CommentContent,
    ) -> RepositoryResult<CommentDetails>;
    fn delete_comment(&self, id: CommentId) -> RepositoryResult<bool>;
}

/// Read-only operations over favorites and follow relationships.
pub trait SocialReader {
    fn is_favorited(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool>;
    /// Posts favorited by the user, most recently favorited first.
    fn list_favorite_posts(
        &self,
        user_id: UserId,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<PostDetails>)>;
    fn is_following(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool>;
    /// Users followed by `user_id`.
    fn list_following(&self, user_id: UserId) -> RepositoryResult<Vec<User>>;
    /// Users following `user_id`.
    fn list_followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>>;
}

/// Write operations over favorites and follow relationships.
pub trait SocialWriter {
    fn add_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<FavoriteOutcome>;
    fn remove_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool>;
    fn follow_user(
        &self,
        follower_id: UserId,
        following_id: UserId,
    ) -> RepositoryResult<FollowOutcome>;
    fn unfollow_user(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool>;
}

/// Site-wide aggregates for the admin report.
pub trait StatsReader {
    /// Totals, counting users created at or after `recent_since` as recent.
    fn site_totals(&self, recent_since: NaiveDateTime) -> RepositoryResult<SiteTotals>;
}
