use serde::Serialize;

use crate::domain::stats::SiteTotals;

/// Averages are taken over a fixed 30-day window.
const POSTS_PER_DAY_WINDOW: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStatsDto {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub recent_users: i64,
    pub posts_per_day: f64,
    pub comments_per_post: f64,
}

impl From<SiteTotals> for AdminStatsDto {
    fn from(value: SiteTotals) -> Self {
        let (posts_per_day, comments_per_post) = if value.total_posts > 0 {
            (
                value.total_posts as f64 / POSTS_PER_DAY_WINDOW,
                value.total_comments as f64 / value.total_posts as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_users: value.total_users,
            total_posts: value.total_posts,
            total_comments: value.total_comments,
            recent_users: value.recent_users,
            posts_per_day,
            comments_per_post,
        }
    }
}
