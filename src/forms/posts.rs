use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::post::{NewPost, PostUpdate};
use crate::domain::types::{CategoryId, PostContent, PostTitle, TypeConstraintError, UserId};

fn default_published() -> bool {
    true
}

fn category_ids(ids: Vec<i32>) -> Result<Vec<CategoryId>, TypeConstraintError> {
    ids.into_iter().map(CategoryId::new).collect()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub summary: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub category_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePostFormPayload {
    pub title: PostTitle,
    pub content: PostContent,
    pub summary: Option<String>,
    pub is_published: bool,
    pub category_ids: Vec<CategoryId>,
}

impl CreatePostFormPayload {
    pub fn into_new_post(self, author_id: UserId) -> NewPost {
        NewPost {
            author_id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            is_published: self.is_published,
            category_ids: self.category_ids,
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PostFormError {
    #[error("Post form validation failed: {0}")]
    Validation(String),
    #[error("Post form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for PostFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for PostFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CreatePostForm> for CreatePostFormPayload {
    type Error = PostFormError;

    fn try_from(value: CreatePostForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            title: PostTitle::new(value.title)?,
            content: PostContent::new(value.content)?,
            summary: value.summary,
            is_published: value.is_published,
            category_ids: category_ids(value.category_ids.unwrap_or_default())?,
        })
    }
}

/// Partial post update. A present `category_ids` replaces the whole set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostForm {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub summary: Option<String>,
    pub is_published: Option<bool>,
    pub category_ids: Option<Vec<i32>>,
}

impl TryFrom<UpdatePostForm> for PostUpdate {
    type Error = PostFormError;

    fn try_from(value: UpdatePostForm) -> Result<Self, Self::Error> {
        value.validate()?;

        Ok(Self {
            title: value.title.map(PostTitle::new).transpose()?,
            content: value.content.map(PostContent::new).transpose()?,
            summary: value.summary,
            is_published: value.is_published,
            category_ids: value.category_ids.map(category_ids).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_published_without_categories() {
        let form: CreatePostForm =
            serde_json::from_str(r#"{"title": "Hello", "content": "World"}"#).unwrap();
        let payload: CreatePostFormPayload = form.try_into().unwrap();
        assert!(payload.is_published);
        assert!(payload.category_ids.is_empty());
    }

    #[test]
    fn create_rejects_long_title_and_blank_content() {
        let form = CreatePostForm {
            title: "x".repeat(201),
            content: "body".to_string(),
            summary: None,
            is_published: true,
            category_ids: None,
        };
        let payload: Result<CreatePostFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(PostFormError::Validation(_))));

        let form = CreatePostForm {
            title: "Title".to_string(),
            content: "   ".to_string(),
            summary: None,
            is_published: true,
            category_ids: None,
        };
        let payload: Result<CreatePostFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(PostFormError::TypeConstraint(_))));
    }

    #[test]
    fn update_keeps_absent_fields_empty() {
        let form = UpdatePostForm {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        let update: PostUpdate = form.try_into().unwrap();
        assert_eq!(update.title.unwrap().as_str(), "New title");
        assert!(update.content.is_none());
        assert!(update.category_ids.is_none());
    }
}
