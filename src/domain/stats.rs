use serde::{Deserialize, Serialize};

/// Site-wide totals for the admin report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteTotals {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    /// Users registered within the report window.
    pub recent_users: i64,
}
