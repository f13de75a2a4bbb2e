use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::{
    Category as DomainCategory, CategoryUpdate, NewCategory as DomainNewCategory,
};
use crate::domain::types::{CategoryName, Slug, TypeConstraintError};

/// Diesel model representing the `categories` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::categories)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Insertable form of [`Category`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Patchable form of [`Category`].
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::categories)]
pub struct CategoryChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.id.try_into()?,
            name: CategoryName::new(category.name)?,
            slug: Slug::new(category.slug)?,
            description: category.description,
            created_at: category.created_at,
        })
    }
}

impl From<DomainNewCategory> for NewCategory {
    fn from(category: DomainNewCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            slug: category.slug.into_inner(),
            description: category.description,
            created_at: category.created_at,
        }
    }
}

impl<'a> From<&'a CategoryUpdate> for CategoryChangeset<'a> {
    fn from(update: &'a CategoryUpdate) -> Self {
        Self {
            name: update.name.as_ref().map(CategoryName::as_str),
            slug: update.slug.as_ref().map(Slug::as_str),
            description: update.description.as_deref(),
        }
    }
}
