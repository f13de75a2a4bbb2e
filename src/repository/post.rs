use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::category::Category;
use crate::domain::post::{
    NewPost, Post, PostDetails, PostOrderBy, PostStats, PostUpdate, SortOrder,
};
use crate::domain::types::{CategoryId, PostId};
use crate::domain::user::User;
use crate::models::category::Category as DbCategory;
use crate::models::post::{NewPost as DbNewPost, NewPostCategory, Post as DbPost, PostChangeset};
use crate::models::user::User as DbUser;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PostListQuery, PostReader, PostWriter};
use crate::schema::{categories, comments, favorites, post_categories, posts, users};

/// Attach authors and categories to loaded post rows using one query per
/// relation, preserving the order of `rows`.
pub(crate) fn load_post_details(
    conn: &mut SqliteConnection,
    rows: Vec<DbPost>,
) -> RepositoryResult<Vec<PostDetails>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
    let author_ids: Vec<i32> = rows.iter().map(|p| p.author_id).collect();

    let authors = users::table
        .filter(users::id.eq_any(author_ids))
        .load::<DbUser>(conn)?
        .into_iter()
        .map(|u| -> RepositoryResult<(i32, User)> { Ok((u.id, User::try_from(u)?)) })
        .collect::<RepositoryResult<HashMap<i32, User>>>()?;

    let mut categories_by_post: HashMap<i32, Vec<Category>> = HashMap::new();
    let links = post_categories::table
        .inner_join(categories::table)
        .filter(post_categories::post_id.eq_any(post_ids))
        .order(categories::name.asc())
        .select((post_categories::post_id, categories::all_columns))
        .load::<(i32, DbCategory)>(conn)?;
    for (post_id, category) in links {
        categories_by_post
            .entry(post_id)
            .or_default()
            .push(category.try_into()?);
    }

    rows.into_iter()
        .map(|row| -> RepositoryResult<PostDetails> {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or(RepositoryError::NotFound)?;
            let categories = categories_by_post.remove(&row.id).unwrap_or_default();
            Ok(PostDetails {
                post: Post::try_from(row)?,
                author,
                categories,
            })
        })
        .collect()
}

fn load_post_details_by_id(
    conn: &mut SqliteConnection,
    id: i32,
) -> RepositoryResult<Option<PostDetails>> {
    let row = posts::table.find(id).first::<DbPost>(conn).optional()?;
    match row {
        Some(row) => Ok(load_post_details(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Replace the category links of `post_id` with the known categories in `ids`.
/// Unknown category ids are skipped.
fn link_categories(
    conn: &mut SqliteConnection,
    post_id: i32,
    ids: &[CategoryId],
) -> RepositoryResult<()> {
    diesel::delete(post_categories::table.filter(post_categories::post_id.eq(post_id)))
        .execute(conn)?;

    if ids.is_empty() {
        return Ok(());
    }

    let requested: Vec<i32> = ids.iter().map(|id| id.get()).collect();
    let known = categories::table
        .filter(categories::id.eq_any(requested))
        .select(categories::id)
        .load::<i32>(conn)?;

    let now = Utc::now().naive_utc();
    let rows: Vec<NewPostCategory> = known
        .into_iter()
        .map(|category_id| NewPostCategory {
            post_id,
            category_id,
            created_at: now,
        })
        .collect();

    if !rows.is_empty() {
        diesel::insert_into(post_categories::table)
            .values(&rows)
            .execute(conn)?;
    }

    Ok(())
}

impl PostReader for DieselRepository {
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostDetails>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = posts::table.into_boxed::<Sqlite>();

            if query.published_only {
                items = items.filter(posts::is_published.eq(true));
            }
            if let Some(author_id) = query.author_id {
                items = items.filter(posts::author_id.eq(author_id.get()));
            }
            if let Some(author_ids) = &query.author_ids {
                let ids: Vec<i32> = author_ids.iter().map(|id| id.get()).collect();
                items = items.filter(posts::author_id.eq_any(ids));
            }
            if let Some(category_id) = query.category_id {
                items = items.filter(
                    posts::id.eq_any(
                        post_categories::table
                            .filter(post_categories::category_id.eq(category_id.get()))
                            .select(post_categories::post_id),
                    ),
                );
            }
            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                let pattern = format!("%{search}%");
                items = items.filter(
                    posts::title
                        .like(pattern.clone())
                        .or(posts::content.like(pattern.clone()))
                        .or(posts::summary.assume_not_null().like(pattern)),
                );
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let items = query_builder();
        let mut items = match (query.order_by, query.order) {
            (PostOrderBy::CreatedAt, SortOrder::Asc) => {
                items.order((posts::created_at.asc(), posts::id.asc()))
            }
            (PostOrderBy::CreatedAt, SortOrder::Desc) => {
                items.order((posts::created_at.desc(), posts::id.desc()))
            }
            (PostOrderBy::UpdatedAt, SortOrder::Asc) => {
                items.order((posts::updated_at.asc(), posts::id.asc()))
            }
            (PostOrderBy::UpdatedAt, SortOrder::Desc) => {
                items.order((posts::updated_at.desc(), posts::id.desc()))
            }
            (PostOrderBy::ViewCount, SortOrder::Asc) => {
                items.order((posts::view_count.asc(), posts::id.asc()))
            }
            (PostOrderBy::ViewCount, SortOrder::Desc) => {
                items.order((posts::view_count.desc(), posts::id.desc()))
            }
            (PostOrderBy::Title, SortOrder::Asc) => {
                items.order((posts::title.asc(), posts::id.asc()))
            }
            (PostOrderBy::Title, SortOrder::Desc) => {
                items.order((posts::title.desc(), posts::id.desc()))
            }
        };
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let rows = items.load::<DbPost>(&mut conn)?;
        let items = load_post_details(&mut conn, rows)?;

        Ok((total, items))
    }

    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<PostDetails>> {
        let mut conn = self.conn()?;
        load_post_details_by_id(&mut conn, id.get())
    }

    fn get_post_by_slug(&self, slug: &str) -> RepositoryResult<Option<PostDetails>> {
        let mut conn = self.conn()?;

        let row = posts::table
            .filter(posts::slug.eq(slug))
            .first::<DbPost>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(load_post_details(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn get_post_stats(&self, id: PostId) -> RepositoryResult<PostStats> {
        let mut conn = self.conn()?;

        let likes_count = favorites::table
            .filter(favorites::post_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;
        let comments_count = comments::table
            .filter(comments::post_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(PostStats {
            likes_count,
            comments_count,
        })
    }
}

impl PostWriter for DieselRepository {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<PostDetails> {
        let mut conn = self.conn()?;

        let slug = post.slug();
        let published_at = post.published_at();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            users::table
                .find(post.author_id.get())
                .select(users::id)
                .first::<i32>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let row = diesel::insert_into(posts::table)
                .values(DbNewPost {
                    author_id: post.author_id.get(),
                    title: post.title.as_str(),
                    slug: slug.as_str(),
                    content: post.content.as_str(),
                    summary: post.summary.as_deref(),
                    is_published: post.is_published,
                    published_at,
                    created_at: post.created_at,
                    updated_at: post.created_at,
                })
                .get_result::<DbPost>(conn)?;

            link_categories(conn, row.id, &post.category_ids)?;

            load_post_details_by_id(conn, row.id)?.ok_or(RepositoryError::NotFound)
        })
    }

    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<PostDetails> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let current = posts::table.find(id.get()).first::<DbPost>(conn)?;

            let changeset = PostChangeset {
                title: update.title.as_ref().map(|t| t.as_str()),
                content: update.content.as_ref().map(|c| c.as_str()),
                summary: update.summary.as_deref(),
                is_published: update.is_published,
                published_at: update.published_at(current.published_at, now),
                updated_at: now,
            };
            diesel::update(posts::table.find(id.get()))
                .set(changeset)
                .execute(conn)?;

            if let Some(category_ids) = &update.category_ids {
                link_categories(conn, id.get(), category_ids)?;
            }

            load_post_details_by_id(conn, id.get())?.ok_or(RepositoryError::NotFound)
        })
    }

    fn delete_post(&self, id: PostId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(posts::table.find(id.get())).execute(&mut conn)?;

        Ok(affected > 0)
    }

    fn increment_post_views(&self, id: PostId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::update(posts::table.find(id.get()))
            .set(posts::view_count.eq(posts::view_count + 1))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
