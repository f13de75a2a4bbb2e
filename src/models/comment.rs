use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::comment::{Comment as DomainComment, NewComment as DomainNewComment};
use crate::domain::types::{CommentContent, CommentId, TypeConstraintError};

/// Diesel model representing a row in the `comments` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::comments)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
    pub parent_id: Option<i32>,
    pub is_edited: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment<'a> {
    pub post_id: i32,
    pub user_id: i32,
    pub content: &'a str,
    pub parent_id: Option<i32>,
    pub is_edited: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Comment> for DomainComment {
    type Error = TypeConstraintError;

    fn try_from(comment: Comment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: comment.id.try_into()?,
            post_id: comment.post_id.try_into()?,
            user_id: comment.user_id.try_into()?,
            content: CommentContent::new(comment.content)?,
            parent_id: comment.parent_id.map(CommentId::new).transpose()?,
            is_edited: comment.is_edited,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewComment> for NewComment<'a> {
    fn from(comment: &'a DomainNewComment) -> Self {
        Self {
            post_id: comment.post_id.get(),
            user_id: comment.user_id.get(),
            content: comment.content.as_str(),
            parent_id: comment.parent_id.map(CommentId::get),
            is_edited: false,
            created_at: comment.created_at,
            updated_at: comment.created_at,
        }
    }
}
