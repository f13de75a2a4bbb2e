use diesel::prelude::*;

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::types::CategoryId;
use crate::models::category::{
    Category as DbCategory, CategoryChangeset, NewCategory as DbNewCategory,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{CategoryListQuery, CategoryReader, CategoryWriter, DieselRepository};

impl CategoryReader for DieselRepository {
    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = categories::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                let pattern = format!("%{search}%");
                items = items.filter(
                    categories::name
                        .like(pattern.clone())
                        .or(categories::slug.like(pattern.clone()))
                        .or(categories::description.assume_not_null().like(pattern)),
                );
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let items = items
            .order((categories::name.asc(), categories::id.asc()))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok((total, items))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .find(id.get())
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::slug.eq(slug))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let db_category: DbNewCategory = category.clone().into();

        let created = diesel::insert_into(categories::table)
            .values(db_category)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        // An empty changeset is rejected by diesel, so return the row as is.
        let updated = if update.is_empty() {
            categories::table
                .find(id.get())
                .first::<DbCategory>(&mut conn)?
        } else {
            diesel::update(categories::table.find(id.get()))
                .set(CategoryChangeset::from(update))
                .get_result::<DbCategory>(&mut conn)?
        };

        Ok(updated.try_into()?)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let affected = diesel::delete(categories::table.find(id.get())).execute(&mut conn)?;

        Ok(affected > 0)
    }
}
