use chrono::Utc;
use diesel::prelude::*;

use crate::domain::types::{Email, Login, UserId};
use crate::domain::user::{NewUser, User, UserStats, UserUpdate};
use crate::models::user::{NewUser as DbNewUser, User as DbUser, UserChangeset};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserListQuery, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .find(id.get())
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn get_user_by_login(&self, login: &Login) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::login.eq(login.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = users::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
                // SQLite LIKE is case-insensitive for ASCII.
                let pattern = format!("%{search}%");
                items = items.filter(
                    users::login
                        .like(pattern.clone())
                        .or(users::email.like(pattern.clone()))
                        .or(users::full_name.assume_not_null().like(pattern)),
                );
            }
            if let Some(is_active) = query.is_active {
                items = items.filter(users::is_active.eq(is_active));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((users::created_at.desc(), users::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let items = items
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok((total, items))
    }

    fn get_user_stats(&self, id: UserId) -> RepositoryResult<UserStats> {
        use crate::schema::{posts, subscriptions};

        let mut conn = self.conn()?;

        let posts_count = posts::table
            .filter(posts::author_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;
        let followers_count = subscriptions::table
            .filter(subscriptions::following_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;
        let following_count = subscriptions::table
            .filter(subscriptions::follower_id.eq(id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(UserStats {
            posts_count,
            followers_count,
            following_count,
        })
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let created = diesel::insert_into(users::table)
            .values(DbNewUser::from(user))
            .get_result::<DbUser>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let changeset = UserChangeset::new(update, Utc::now().naive_utc());

        let updated = diesel::update(users::table.find(id.get()))
            .set(changeset)
            .get_result::<DbUser>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected = diesel::delete(users::table.find(id.get())).execute(&mut conn)?;

        Ok(affected > 0)
    }
}
