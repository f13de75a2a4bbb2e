use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::post::{PostOrderBy, SortOrder};
use crate::domain::types::{CategoryId, PostId, TypeConstraintError, UserId};
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination};

#[derive(Debug, Error)]
pub enum QueryParamsError {
    #[error("Query parameters are invalid: {0}")]
    Validation(String),
    #[error("Query parameters contain invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for QueryParamsError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for QueryParamsError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// `page` is 1-indexed and capped at 1 000 000; `page_size` defaults to 20 and is capped at 100.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageParams {
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,
}

impl TryFrom<PageParams> for Pagination {
    type Error = QueryParamsError;

    fn try_from(value: PageParams) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Pagination::new(
            value.page.unwrap_or(1),
            value.page_size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
        ))
    }
}

/// `GET /users` and `GET /search/users`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserListParams {
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserListPayload {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub pagination: Pagination,
}

impl TryFrom<UserListParams> for UserListPayload {
    type Error = QueryParamsError;

    fn try_from(value: UserListParams) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            search: normalize_search(value.search),
            is_active: value.is_active,
            pagination: PageParams {
                page: value.page,
                page_size: value.page_size,
            }
            .try_into()?,
        })
    }
}

/// `GET /posts`, `GET /search/posts` and the admin post listing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostListParams {
    pub author_id: Option<i32>,
    pub category_id: Option<i32>,
    #[serde(alias = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub order_by: PostOrderBy,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub include_unpublished: bool,
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostListPayload {
    pub author_id: Option<UserId>,
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub order_by: PostOrderBy,
    pub order: SortOrder,
    pub include_unpublished: bool,
    pub pagination: Pagination,
}

impl TryFrom<PostListParams> for PostListPayload {
    type Error = QueryParamsError;

    fn try_from(value: PostListParams) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            author_id: value.author_id.map(UserId::new).transpose()?,
            category_id: value.category_id.map(CategoryId::new).transpose()?,
            search: normalize_search(value.search),
            order_by: value.order_by,
            order: value.order,
            include_unpublished: value.include_unpublished,
            pagination: PageParams {
                page: value.page,
                page_size: value.page_size,
            }
            .try_into()?,
        })
    }
}

/// `GET /comments`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentListParams {
    pub post_id: Option<i32>,
    pub user_id: Option<i32>,
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentListPayload {
    pub post_id: Option<PostId>,
    pub user_id: Option<UserId>,
    pub pagination: Pagination,
}

impl TryFrom<CommentListParams> for CommentListPayload {
    type Error = QueryParamsError;

    fn try_from(value: CommentListParams) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            post_id: value.post_id.map(PostId::new).transpose()?,
            user_id: value.user_id.map(UserId::new).transpose()?,
            pagination: PageParams {
                page: value.page,
                page_size: value.page_size,
            }
            .try_into()?,
        })
    }
}

/// `GET /categories`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CategoryListParams {
    pub search: Option<String>,
    #[validate(range(min = 1, max = 1000000))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryListPayload {
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl TryFrom<CategoryListParams> for CategoryListPayload {
    type Error = QueryParamsError;

    fn try_from(value: CategoryListParams) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            search: normalize_search(value.search),
            pagination: PageParams {
                page: value.page,
                page_size: value.page_size,
            }
            .try_into()?,
        })
    }
}

fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        let pagination: Pagination = PageParams::default().try_into().unwrap();
        assert_eq!(pagination, Pagination::new(1, 20));
    }

    #[test]
    fn rejects_out_of_range_pages() {
        let zero_page: Result<Pagination, _> = PageParams {
            page: Some(0),
            page_size: None,
        }
        .try_into();
        assert!(zero_page.is_err());

        let huge_page: Result<Pagination, _> = PageParams {
            page: None,
            page_size: Some(101),
        }
        .try_into();
        assert!(huge_page.is_err());
    }

    #[test]
    fn post_params_convert_ids_and_trim_search() {
        let params = PostListParams {
            author_id: Some(3),
            search: Some("  rust ".to_string()),
            page: Some(2),
            page_size: Some(5),
            ..Default::default()
        };
        let payload: PostListPayload = params.try_into().unwrap();
        assert_eq!(payload.author_id, Some(UserId::new(3).unwrap()));
        assert_eq!(payload.search.as_deref(), Some("rust"));
        assert_eq!(payload.pagination, Pagination::new(2, 5));
        assert_eq!(payload.order, SortOrder::Desc);
    }

    #[test]
    fn post_params_reject_non_positive_ids() {
        let params = PostListParams {
            category_id: Some(0),
            ..Default::default()
        };
        let payload: Result<PostListPayload, _> = params.try_into();
        assert!(matches!(payload, Err(QueryParamsError::TypeConstraint(_))));
    }
}
