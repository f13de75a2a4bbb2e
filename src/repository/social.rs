use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::post::PostDetails;
use crate::domain::social::{FavoriteOutcome, FollowOutcome};
use crate::domain::types::{PostId, UserId};
use crate::domain::user::User;
use crate::models::post::Post as DbPost;
use crate::models::social::{NewFavorite, NewSubscription};
use crate::models::user::User as DbUser;
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryResult;
use crate::repository::post::load_post_details;
use crate::repository::{DieselRepository, SocialReader, SocialWriter};
use crate::schema::{favorites, posts, subscriptions, users};

impl SocialReader for DieselRepository {
    fn is_favorited(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let count = favorites::table
            .find((user_id.get(), post_id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }

    fn list_favorite_posts(
        &self,
        user_id: UserId,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<PostDetails>)> {
        let mut conn = self.conn()?;

        let total = favorites::table
            .filter(favorites::user_id.eq(user_id.get()))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = favorites::table
            .inner_join(posts::table)
            .filter(favorites::user_id.eq(user_id.get()))
            .order((favorites::created_at.desc(), favorites::post_id.desc()))
            .select(posts::all_columns)
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pagination) = &pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let rows = items.load::<DbPost>(&mut conn)?;
        let items = load_post_details(&mut conn, rows)?;

        Ok((total, items))
    }

    fn is_following(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let count = subscriptions::table
            .find((follower_id.get(), following_id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }

    fn list_following(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let mut conn = self.conn()?;

        let users = users::table
            .filter(
                users::id.eq_any(
                    subscriptions::table
                        .filter(subscriptions::follower_id.eq(user_id.get()))
                        .select(subscriptions::following_id),
                ),
            )
            .order(users::login.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok(users)
    }

    fn list_followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let mut conn = self.conn()?;

        let users = users::table
            .filter(
                users::id.eq_any(
                    subscriptions::table
                        .filter(subscriptions::following_id.eq(user_id.get()))
                        .select(subscriptions::follower_id),
                ),
            )
            .order(users::login.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok(users)
    }
}

impl SocialWriter for DieselRepository {
    fn add_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<FavoriteOutcome> {
        let mut conn = self.conn()?;

        // The primary key decides; a second insert of the same pair is ignored.
        let affected = diesel::insert_or_ignore_into(favorites::table)
            .values(NewFavorite {
                user_id: user_id.get(),
                post_id: post_id.get(),
                created_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)?;

        Ok(if affected > 0 {
            FavoriteOutcome::Added
        } else {
            FavoriteOutcome::AlreadyFavorited
        })
    }

    fn remove_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(favorites::table.find((user_id.get(), post_id.get())))
            .execute(&mut conn)?;

        Ok(affected > 0)
    }

    fn follow_user(
        &self,
        follower_id: UserId,
        following_id: UserId,
    ) -> RepositoryResult<FollowOutcome> {
        if follower_id == following_id {
            return Ok(FollowOutcome::SelfFollow);
        }

        let mut conn = self.conn()?;

        let inserted = diesel::insert_into(subscriptions::table)
            .values(NewSubscription {
                follower_id: follower_id.get(),
                following_id: following_id.get(),
                created_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn);

        match inserted {
            Ok(_) => Ok(FollowOutcome::Followed),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(FollowOutcome::AlreadyFollowing)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _)) => {
                Ok(FollowOutcome::SelfFollow)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn unfollow_user(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(
            subscriptions::table.find((follower_id.get(), following_id.get())),
        )
        .execute(&mut conn)?;

        Ok(affected > 0)
    }
}
