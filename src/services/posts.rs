use crate::domain::auth::Identity;
use crate::domain::post::{PostDetails, PostUpdate};
use crate::domain::types::PostId;
use crate::dto::posts::{PostDto, PostWithStatsDto};
use crate::forms::posts::CreatePostFormPayload;
use crate::forms::query::PostListPayload;
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryError;
use crate::repository::{PostListQuery, PostReader, PostWriter, SocialReader};
use crate::services::access::{require_active, require_authenticated, require_owner_or_admin};

use super::{ServiceError, ServiceResult};

pub(crate) fn post_not_found() -> ServiceError {
    ServiceError::NotFound("Post not found".to_string())
}

/// Attach read-time favorite and comment counts to a post.
pub(crate) fn with_stats<R>(repo: &R, details: PostDetails) -> ServiceResult<PostWithStatsDto>
where
    R: PostReader,
{
    let stats = repo
        .get_post_stats(details.post.id)
        .map_err(|e| ServiceError::from_repository("count post stats", e))?;
    Ok(PostWithStatsDto::new(details, stats))
}

pub(crate) fn load_post<R>(post_id: PostId, repo: &R) -> ServiceResult<PostDetails>
where
    R: PostReader,
{
    repo.get_post_by_id(post_id)
        .map_err(|e| ServiceError::from_repository("load post", e))?
        .ok_or_else(post_not_found)
}

/// Drafts are visible to their author and to admins only.
fn ensure_visible(details: &PostDetails, identity: &Identity) -> ServiceResult<()> {
    if details.post.is_published || identity.can_manage(details.post.author_id) {
        Ok(())
    } else {
        Err(ServiceError::not_enough_permissions())
    }
}

/// Run a listing query and attach stats to every row.
pub(crate) fn list_with_stats<R>(
    query: PostListQuery,
    repo: &R,
) -> ServiceResult<Vec<PostWithStatsDto>>
where
    R: PostReader,
{
    let (_total, posts) = repo
        .list_posts(query)
        .map_err(|e| ServiceError::from_repository("list posts", e))?;
    posts
        .into_iter()
        .map(|details| with_stats(repo, details))
        .collect()
}

/// Public post listing. Only admins see drafts.
pub fn list_posts<R>(
    payload: PostListPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<PostWithStatsDto>>
where
    R: PostReader,
{
    let query = PostListQuery {
        published_only: !identity.is_admin(),
        author_id: payload.author_id,
        author_ids: None,
        category_id: payload.category_id,
        search: payload.search,
        order_by: payload.order_by,
        order: payload.order,
        pagination: Some(payload.pagination),
    };
    list_with_stats(query, repo)
}

pub fn get_post<R>(
    post_id: PostId,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<PostWithStatsDto>
where
    R: PostReader,
{
    let details = load_post(post_id, repo)?;
    ensure_visible(&details, identity)?;
    with_stats(repo, details)
}

pub fn get_post_by_slug<R>(
    slug: &str,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<PostWithStatsDto>
where
    R: PostReader,
{
    let details = repo
        .get_post_by_slug(slug)
        .map_err(|e| ServiceError::from_repository("load post by slug", e))?
        .ok_or_else(post_not_found)?;
    ensure_visible(&details, identity)?;
    with_stats(repo, details)
}

/// Bump the view counter. Failures are logged and never reach the reader.
pub fn record_view<R>(post_id: PostId, repo: &R)
where
    R: PostWriter,
{
    match repo.increment_post_views(post_id) {
        Ok(0) => log::debug!("Post {post_id} vanished before its view was counted"),
        Ok(_) => {}
        Err(e) => log::error!("Failed to increment views of post {post_id}: {e}"),
    }
}

pub fn create_post<R>(
    payload: CreatePostFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<PostDto>
where
    R: PostWriter,
{
    let author = require_active(identity)?;
    let new_post = payload.into_new_post(author.id);

    match repo.create_post(&new_post) {
        Ok(details) => Ok(details.into()),
        Err(e) => Err(ServiceError::from_repository("create post", e)),
    }
}

pub fn update_post<R>(
    post_id: PostId,
    update: PostUpdate,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<PostDto>
where
    R: PostReader + PostWriter,
{
    require_authenticated(identity)?;
    let details = load_post(post_id, repo)?;
    require_owner_or_admin(identity, details.post.author_id)?;

    match repo.update_post(post_id, &update) {
        Ok(details) => Ok(details.into()),
        Err(RepositoryError::NotFound) => Err(post_not_found()),
        Err(e) => Err(ServiceError::from_repository("update post", e)),
    }
}

pub fn delete_post<R>(post_id: PostId, identity: &Identity, repo: &R) -> ServiceResult<()>
where
    R: PostReader + PostWriter,
{
    require_authenticated(identity)?;
    let details = load_post(post_id, repo)?;
    require_owner_or_admin(identity, details.post.author_id)?;

    match repo.delete_post(post_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(post_not_found()),
        Err(e) => Err(ServiceError::from_repository("delete post", e)),
    }
}

/// Published posts of the authors the caller follows, newest first.
pub fn feed<R>(
    pagination: Pagination,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<Vec<PostWithStatsDto>>
where
    R: PostReader + SocialReader,
{
    let current = require_active(identity)?;

    let following = repo
        .list_following(current.id)
        .map_err(|e| ServiceError::from_repository("list followed users", e))?;
    if following.is_empty() {
        return Ok(vec![]);
    }

    let query = PostListQuery::default()
        .published()
        .authors(following.into_iter().map(|user| user.id).collect())
        .paginate(pagination.page, pagination.per_page);
    list_with_stats(query, repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{PostOrderBy, SortOrder};
    use crate::domain::types::{PostContent, PostTitle};
    use crate::repository::{MemoryRepository, SocialWriter};
    use crate::services::test_support::{identity_of, seed_post, seed_user};

    fn list_payload() -> PostListPayload {
        PostListPayload {
            author_id: None,
            category_id: None,
            search: None,
            order_by: PostOrderBy::CreatedAt,
            order: SortOrder::Desc,
            include_unpublished: false,
            pagination: Pagination::default(),
        }
    }

    #[test]
    fn drafts_are_listed_for_admins_only() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        seed_post(&repo, &john, "Published", true);
        seed_post(&repo, &john, "Draft", false);

        let public = list_posts(list_payload(), &Identity::Anonymous, &repo).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].post.title, "Published");

        let own = list_posts(list_payload(), &identity_of(&john), &repo).unwrap();
        assert_eq!(own.len(), 1);

        let all = list_posts(list_payload(), &identity_of(&admin), &repo).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn draft_detail_is_owner_or_admin_only() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        let jane = seed_user(&repo, "jane", false);
        let draft = seed_post(&repo, &john, "Draft", false);
        let id = draft.post.id;

        assert!(get_post(id, &identity_of(&john), &repo).is_ok());
        assert!(get_post(id, &identity_of(&admin), &repo).is_ok());
        assert_eq!(
            get_post(id, &identity_of(&jane), &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );
        assert_eq!(
            get_post(id, &Identity::Anonymous, &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );
        assert_eq!(
            get_post_by_slug(draft.post.slug.as_str(), &identity_of(&jane), &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );
    }

    #[test]
    fn missing_post_is_not_found() {
        let repo = MemoryRepository::new();
        assert_eq!(
            get_post(PostId::new(42).unwrap(), &Identity::Anonymous, &repo).unwrap_err(),
            post_not_found()
        );
    }

    #[test]
    fn views_are_counted() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);
        let post = seed_post(&repo, &john, "Popular", true);

        record_view(post.post.id, &repo);
        record_view(post.post.id, &repo);
        record_view(PostId::new(999).unwrap(), &repo);

        let dto = get_post(post.post.id, &Identity::Anonymous, &repo).unwrap();
        assert_eq!(dto.post.view_count, 2);
    }

    #[test]
    fn create_requires_active_author() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);
        let payload = CreatePostFormPayload {
            title: PostTitle::new("Hello World").unwrap(),
            content: PostContent::new("Body").unwrap(),
            summary: None,
            is_published: false,
            category_ids: vec![],
        };

        assert!(matches!(
            create_post(payload.clone(), &Identity::Anonymous, &repo),
            Err(ServiceError::Unauthenticated(_))
        ));
        let dto = create_post(payload, &identity_of(&john), &repo).unwrap();
        assert_eq!(dto.author_id, john.id.get());
        assert!(dto.slug.starts_with("hello-world-"));
        assert_eq!(dto.published_at, None);
    }

    #[test]
    fn update_and_delete_are_owner_or_admin() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        let jane = seed_user(&repo, "jane", false);
        let post = seed_post(&repo, &john, "Original", true);
        let id = post.post.id;
        let retitle = || PostUpdate {
            title: Some(PostTitle::new("Retitled").unwrap()),
            ..Default::default()
        };

        assert_eq!(
            update_post(id, retitle(), &identity_of(&jane), &repo).unwrap_err(),
            ServiceError::not_enough_permissions()
        );
        let updated = update_post(id, retitle(), &identity_of(&john), &repo).unwrap();
        assert_eq!(updated.title, "Retitled");
        assert_eq!(updated.content, "Original body");

        assert!(delete_post(id, &identity_of(&jane), &repo).is_err());
        assert!(delete_post(id, &identity_of(&admin), &repo).is_ok());
        assert_eq!(
            delete_post(id, &identity_of(&admin), &repo).unwrap_err(),
            post_not_found()
        );
    }

    #[test]
    fn feed_lists_followed_authors() {
        let repo = MemoryRepository::new();
        let reader = seed_user(&repo, "reader", false);
        let john = seed_user(&repo, "john", false);
        let jane = seed_user(&repo, "jane", false);
        seed_post(&repo, &john, "From John", true);
        seed_post(&repo, &john, "John Draft", false);
        seed_post(&repo, &jane, "From Jane", true);

        let empty = feed(Pagination::default(), &identity_of(&reader), &repo).unwrap();
        assert!(empty.is_empty());

        repo.follow_user(reader.id, john.id).unwrap();
        let posts = feed(Pagination::default(), &identity_of(&reader), &repo).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.title, "From John");
    }
}
