use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::comment::{Comment, CommentDetails, NewComment};
use crate::domain::types::{CommentContent, CommentId};
use crate::domain::user::User;
use crate::models::comment::{Comment as DbComment, NewComment as DbNewComment};
use crate::models::user::User as DbUser;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CommentListQuery, CommentReader, CommentWriter, DieselRepository};
use crate::schema::{comments, users};

fn with_authors(
    conn: &mut SqliteConnection,
    rows: Vec<DbComment>,
) -> RepositoryResult<Vec<CommentDetails>> {
    let user_ids: Vec<i32> = rows.iter().map(|c| c.user_id).collect();

    let authors = users::table
        .filter(users::id.eq_any(user_ids))
        .load::<DbUser>(conn)?
        .into_iter()
        .map(|u| -> RepositoryResult<(i32, User)> { Ok((u.id, User::try_from(u)?)) })
        .collect::<RepositoryResult<HashMap<i32, User>>>()?;

    rows.into_iter()
        .map(|row| -> RepositoryResult<CommentDetails> {
            let user = authors
                .get(&row.user_id)
                .cloned()
                .ok_or(RepositoryError::NotFound)?;
            Ok(CommentDetails {
                comment: Comment::try_from(row)?,
                user,
            })
        })
        .collect()
}

impl CommentReader for DieselRepository {
    fn list_comments(
        &self,
        query: CommentListQuery,
    ) -> RepositoryResult<(usize, Vec<CommentDetails>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = comments::table.into_boxed::<diesel::sqlite::Sqlite>();
            if let Some(post_id) = query.post_id {
                items = items.filter(comments::post_id.eq(post_id.get()));
            }
            if let Some(user_id) = query.user_id {
                items = items.filter(comments::user_id.eq(user_id.get()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items =
            query_builder().order((comments::created_at.desc(), comments::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let rows = items.load::<DbComment>(&mut conn)?;
        let items = with_authors(&mut conn, rows)?;

        Ok((total, items))
    }

    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        let mut conn = self.conn()?;

        let comment = comments::table
            .find(id.get())
            .first::<DbComment>(&mut conn)
            .optional()?;

        Ok(comment.map(TryInto::try_into).transpose()?)
    }
}

impl CommentWriter for DieselRepository {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<CommentDetails> {
        let mut conn = self.conn()?;

        let row = diesel::insert_into(comments::table)
            .values(DbNewComment::from(comment))
            .get_result::<DbComment>(&mut conn)?;

        with_authors(&mut conn, vec![row])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn update_comment(
        &self,
        id: CommentId,
        content: &CommentContent,
    ) -> RepositoryResult<CommentDetails> {
        let mut conn = self.conn()?;

        let row = diesel::update(comments::table.find(id.get()))
            .set((
                comments::content.eq(content.as_str()),
                comments::is_edited.eq(true),
                comments::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbComment>(&mut conn)?;

        with_authors(&mut conn, vec![row])?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_comment(&self, id: CommentId) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let affected = diesel::delete(comments::table.find(id.get())).execute(&mut conn)?;

        Ok(affected > 0)
    }
}
