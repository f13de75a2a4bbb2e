use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::comment::NewComment;
use crate::domain::types::{CommentContent, CommentId, PostId, TypeConstraintError, UserId};

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentForm {
    #[validate(length(min = 1))]
    pub content: String,
    #[validate(range(min = 1))]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCommentFormPayload {
    pub content: CommentContent,
    pub parent_id: Option<CommentId>,
}

impl AddCommentFormPayload {
    pub fn into_new_comment(self, post_id: PostId, user_id: UserId) -> NewComment {
        NewComment {
            post_id,
            user_id,
            content: self.content,
            parent_id: self.parent_id,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommentFormError {
    #[error("Comment form validation failed: {0}")]
    Validation(String),
    #[error("Comment form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CommentFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CommentFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddCommentForm> for AddCommentFormPayload {
    type Error = CommentFormError;

    fn try_from(value: AddCommentForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            content: CommentContent::new(value.content)?,
            parent_id: value.parent_id.map(CommentId::new).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentForm {
    #[validate(length(min = 1))]
    pub content: String,
}

impl TryFrom<UpdateCommentForm> for CommentContent {
    type Error = CommentFormError;

    fn try_from(value: UpdateCommentForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(CommentContent::new(value.content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_requires_content() {
        let form = AddCommentForm {
            content: "  ".to_string(),
            parent_id: None,
        };
        let payload: Result<AddCommentFormPayload, _> = form.try_into();
        assert!(payload.is_err());
    }

    #[test]
    fn reply_keeps_parent() {
        let form = AddCommentForm {
            content: "agreed".to_string(),
            parent_id: Some(4),
        };
        let payload: AddCommentFormPayload = form.try_into().unwrap();
        assert_eq!(payload.parent_id, Some(CommentId::new(4).unwrap()));
    }
}
