use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::stats::SiteTotals;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, StatsReader};

impl StatsReader for DieselRepository {
    fn site_totals(&self, recent_since: NaiveDateTime) -> RepositoryResult<SiteTotals> {
        use crate::schema::{comments, posts, users};

        let mut conn = self.conn()?;

        let total_users = users::table.count().get_result::<i64>(&mut conn)?;
        let total_posts = posts::table.count().get_result::<i64>(&mut conn)?;
        let total_comments = comments::table.count().get_result::<i64>(&mut conn)?;
        let recent_users = users::table
            .filter(users::created_at.ge(recent_since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(SiteTotals {
            total_users,
            total_posts,
            total_comments,
            recent_users,
        })
    }
}
