//! Admin-only reports.

use chrono::{Duration, Utc};

use crate::domain::auth::Identity;
use crate::domain::types::UserId;
use crate::dto::admin::AdminStatsDto;
use crate::dto::posts::PostWithStatsDto;
use crate::pagination::Pagination;
use crate::repository::{PostListQuery, PostReader, StatsReader};
use crate::services::access::require_admin;
use crate::services::posts::list_with_stats;

use super::{ServiceError, ServiceResult};

/// Users registered within this many days count as recent.
const RECENT_USER_DAYS: i64 = 7;

pub fn site_stats<R>(identity: &Identity, repo: &R) -> ServiceResult<AdminStatsDto>
where
    R: StatsReader,
{
    require_admin(identity)?;

    let since = Utc::now().naive_utc() - Duration::days(RECENT_USER_DAYS);
    match repo.site_totals(since) {
        Ok(totals) => Ok(totals.into()),
        Err(e) => Err(ServiceError::from_repository("collect site stats", e)),
    }
}

/// Any author's posts, drafts included on request.
pub fn user_posts<R>(
    user_id: UserId,
    include_unpublished: bool,
    pagination: Pagination,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<PostWithStatsDto>>
where
    R: PostReader,
{
    require_admin(identity)?;

    let mut query = PostListQuery::default()
        .author(user_id)
        .paginate(pagination.page, pagination.per_page);
    if !include_unpublished {
        query = query.published();
    }
    list_with_stats(query, repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use crate::services::test_support::{identity_of, seed_post, seed_user};

    #[test]
    fn stats_are_admin_only() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        seed_post(&repo, &john, "One", true);
        seed_post(&repo, &john, "Two", false);

        assert_eq!(
            site_stats(&identity_of(&john), &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );

        let stats = site_stats(&identity_of(&admin), &repo).unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_posts, 2);
        assert_eq!(stats.recent_users, 2);
        assert_eq!(stats.comments_per_post, 0.0);
    }

    #[test]
    fn user_posts_can_include_drafts() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        seed_post(&repo, &john, "One", true);
        seed_post(&repo, &john, "Two", false);
        seed_post(&repo, &admin, "Other", true);
        let identity = identity_of(&admin);

        let published =
            user_posts(john.id, false, Pagination::default(), &identity, &repo).unwrap();
        assert_eq!(published.len(), 1);

        let all = user_posts(john.id, true, Pagination::default(), &identity, &repo).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| p.post.author_id == john.id.get()));
    }
}
