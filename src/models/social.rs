use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Row of the `favorites` association table.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::favorites)]
pub struct NewFavorite {
    pub user_id: i32,
    pub post_id: i32,
    pub created_at: NaiveDateTime,
}

/// Row of the `subscriptions` association table.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscription {
    pub follower_id: i32,
    pub following_id: i32,
    pub created_at: NaiveDateTime,
}
