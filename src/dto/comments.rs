use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::comment::CommentDetails;
use crate::dto::users::UserDto;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentDto {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
    pub parent_id: Option<i32>,
    pub is_edited: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub user: UserDto,
}

impl From<CommentDetails> for CommentDto {
    fn from(value: CommentDetails) -> Self {
        let comment = value.comment;
        Self {
            id: comment.id.get(),
            post_id: comment.post_id.get(),
            user_id: comment.user_id.get(),
            content: comment.content.into_inner(),
            parent_id: comment.parent_id.map(|id| id.get()),
            is_edited: comment.is_edited,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            user: value.user.into(),
        }
    }
}
