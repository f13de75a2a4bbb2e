use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CommentContent, CommentId, PostId, UserId};
use crate::domain::user::User;

/// Comment on a post, optionally replying to another comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: CommentContent,
    pub parent_id: Option<CommentId>,
    pub is_edited: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert a new [`Comment`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: CommentContent,
    pub parent_id: Option<CommentId>,
    pub created_at: NaiveDateTime,
}

/// A comment together with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDetails {
    pub comment: Comment,
    pub user: User,
}
