use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::post::{PostDetails, PostStats};
use crate::dto::categories::CategoryDto;
use crate::dto::users::UserDto;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub summary: Option<String>,
    pub is_published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub view_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub author: UserDto,
    pub categories: Vec<CategoryDto>,
}

impl From<PostDetails> for PostDto {
    fn from(value: PostDetails) -> Self {
        let post = value.post;
        Self {
            id: post.id.get(),
            author_id: post.author_id.get(),
            title: post.title.into_inner(),
            slug: post.slug.into_inner(),
            content: post.content.into_inner(),
            summary: post.summary,
            is_published: post.is_published,
            published_at: post.published_at,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author: value.author.into(),
            categories: value.categories.into_iter().map(CategoryDto::from).collect(),
        }
    }
}

/// A post with its favorite and comment counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithStatsDto {
    #[serde(flatten)]
    pub post: PostDto,
    pub likes_count: i64,
    pub comments_count: i64,
}

impl PostWithStatsDto {
    pub fn new(details: PostDetails, stats: PostStats) -> Self {
        Self {
            post: details.into(),
            likes_count: stats.likes_count,
            comments_count: stats.comments_count,
        }
    }
}
