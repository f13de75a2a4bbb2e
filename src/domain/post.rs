use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::types::{CategoryId, PostContent, PostId, PostTitle, Slug, UserId};
use crate::domain::user::User;

/// A blog post written by a single author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: PostTitle,
    /// Assigned once at creation, never rewritten.
    pub slug: Slug,
    pub content: PostContent,
    pub summary: Option<String>,
    pub is_published: bool,
    /// Stamped on the first transition into the published state.
    pub published_at: Option<NaiveDateTime>,
    pub view_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Information required to create a new [`Post`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: PostTitle,
    pub content: PostContent,
    pub summary: Option<String>,
    pub is_published: bool,
    pub category_ids: Vec<CategoryId>,
    pub created_at: NaiveDateTime,
}

impl NewPost {
    /// Slug for this post: the slugified title plus a nanosecond timestamp.
    pub fn slug(&self) -> Slug {
        let stem = Slug::from_text(self.title.as_str(), "post");
        let suffix = self.created_at.format("%Y%m%d%H%M%S%9f");
        Slug::from_text(&format!("{stem}-{suffix}"), "post")
    }

    /// `published_at` value for a freshly created post.
    pub fn published_at(&self) -> Option<NaiveDateTime> {
        self.is_published.then_some(self.created_at)
    }
}

/// Partial update of a [`Post`].
///
/// `category_ids` replaces the whole category set when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostUpdate {
    pub title: Option<PostTitle>,
    pub content: Option<PostContent>,
    pub summary: Option<String>,
    pub is_published: Option<bool>,
    pub category_ids: Option<Vec<CategoryId>>,
}

impl PostUpdate {
    /// Computes the `published_at` value after applying this update to a post
    /// whose current stamp is `current`.
    pub fn published_at(
        &self,
        current: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        match (current, self.is_published) {
            (Some(stamp), _) => Some(stamp),
            (None, Some(true)) => Some(now),
            (None, _) => None,
        }
    }
}

/// A post with its author and categories eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    pub post: Post,
    pub author: User,
    pub categories: Vec<Category>,
}

/// Counts derived at read time for a single post.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostStats {
    pub likes_count: i64,
    pub comments_count: i64,
}

/// Column a post listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostOrderBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    ViewCount,
    Title,
}

/// Sort direction of a listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}
