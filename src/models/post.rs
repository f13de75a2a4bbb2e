use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::post::Post as DomainPost;
use crate::domain::types::{PostContent, PostTitle, Slug, TypeConstraintError};

/// Diesel model representing a row in the `posts` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::posts)]
pub struct Post {
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
}

/// Insertable form of [`Post`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost<'a> {
    pub author_id: i32,
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub summary: Option<&'a str>,
    pub is_published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Changeset applied by partial updates.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::posts)]
pub struct PostChangeset<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub is_published: Option<bool>,
    pub published_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

/// Row of the `post_categories` association table.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::post_categories)]
pub struct NewPostCategory {
    pub post_id: i32,
    pub category_id: i32,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Post> for DomainPost {
    type Error = TypeConstraintError;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        Ok(Self {
            id: post.id.try_into()?,
            author_id: post.author_id.try_into()?,
            title: PostTitle::new(post.title)?,
            slug: Slug::new(post.slug)?,
            content: PostContent::new(post.content)?,
            summary: post.summary,
            is_published: post.is_published,
            published_at: post.published_at,
            view_count: post.view_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}
