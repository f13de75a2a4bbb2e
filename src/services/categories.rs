use crate::domain::auth::Identity;
use crate::domain::category::CategoryUpdate;
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryDto;
use crate::forms::categories::AddCategoryFormPayload;
use crate::forms::query::CategoryListPayload;
use crate::repository::errors::RepositoryError;
use crate::repository::{CategoryListQuery, CategoryReader, CategoryWriter};
use crate::services::access::require_admin;

use super::{ServiceError, ServiceResult};

fn category_not_found() -> ServiceError {
    ServiceError::NotFound("Category not found".to_string())
}

pub fn show_categories<R>(payload: CategoryListPayload, repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    let query = CategoryListQuery {
        search: payload.search,
        pagination: Some(payload.pagination),
    };

    match repo.list_categories(query) {
        Ok((_total, categories)) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list categories", e)),
    }
}

pub fn show_category<R>(category_id: CategoryId, repo: &R) -> ServiceResult<CategoryDto>
where
    R: CategoryReader,
{
    match repo.get_category_by_id(category_id) {
        Ok(Some(category)) => Ok(category.into()),
        Ok(None) => Err(category_not_found()),
        Err(e) => Err(ServiceError::from_repository("load category", e)),
    }
}

pub fn add_category<R>(
    payload: AddCategoryFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryWriter,
{
    require_admin(identity)?;

    let category = payload.into_new_category();
    match repo.create_category(&category) {
        Ok(category) => Ok(category.into()),
        Err(e) => Err(ServiceError::from_repository("create category", e)),
    }
}

pub fn update_category<R>(
    category_id: CategoryId,
    update: CategoryUpdate,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<CategoryDto>
where
    R: CategoryWriter,
{
    require_admin(identity)?;

    match repo.update_category(category_id, &update) {
        Ok(category) => Ok(category.into()),
        Err(RepositoryError::NotFound) => Err(category_not_found()),
        Err(e) => Err(ServiceError::from_repository("update category", e)),
    }
}

/// Delete a category. Posts filed under it only lose the link.
pub fn delete_category<R>(
    category_id: CategoryId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryWriter,
{
    require_admin(identity)?;

    match repo.delete_category(category_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(category_not_found()),
        Err(e) => Err(ServiceError::from_repository("delete category", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CategoryName, Slug};
    use crate::pagination::Pagination;
    use crate::repository::MemoryRepository;
    use crate::services::test_support::{identity_of, seed_user};

    fn sample_payload(name: &str, slug: &str) -> AddCategoryFormPayload {
        AddCategoryFormPayload {
            name: CategoryName::new(name).unwrap(),
            slug: Slug::new(slug).unwrap(),
            description: None,
        }
    }

    #[test]
    fn admin_manages_categories() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let identity = identity_of(&admin);

        let created = add_category(sample_payload("Rust", "rust"), &identity, &repo).unwrap();
        let id = CategoryId::new(created.id).unwrap();

        let update = CategoryUpdate {
            description: Some("Systems programming".to_string()),
            ..Default::default()
        };
        let updated = update_category(id, update, &identity, &repo).unwrap();
        assert_eq!(updated.name, "Rust");
        assert_eq!(updated.description.as_deref(), Some("Systems programming"));

        let listed = show_categories(
            CategoryListPayload {
                search: Some("rus".to_string()),
                pagination: Pagination::default(),
            },
            &repo,
        )
        .unwrap();
        assert_eq!(listed.len(), 1);

        delete_category(id, &identity, &repo).unwrap();
        assert_eq!(show_category(id, &repo).unwrap_err(), category_not_found());
    }

    #[test]
    fn duplicate_slug_is_conflict() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let identity = identity_of(&admin);

        add_category(sample_payload("Rust", "rust"), &identity, &repo).unwrap();
        assert_eq!(
            add_category(sample_payload("Rust Lang", "rust"), &identity, &repo).unwrap_err(),
            ServiceError::Conflict("Category name or slug already exists".to_string())
        );
    }

    #[test]
    fn regular_users_cannot_manage_categories() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);

        assert_eq!(
            add_category(sample_payload("Rust", "rust"), &identity_of(&john), &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );
    }
}
