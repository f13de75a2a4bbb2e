use crate::domain::auth::Identity;
use crate::domain::comment::Comment;
use crate::domain::types::{CommentContent, CommentId, PostId};
use crate::dto::comments::CommentDto;
use crate::forms::comments::AddCommentFormPayload;
use crate::forms::query::CommentListPayload;
use crate::pagination::Pagination;
use crate::repository::errors::RepositoryError;
use crate::repository::{CommentListQuery, CommentReader, CommentWriter, PostReader};
use crate::services::access::{require_active, require_authenticated, require_owner_or_admin};
use crate::services::posts::load_post;

use super::{ServiceError, ServiceResult};

fn comment_not_found() -> ServiceError {
    ServiceError::NotFound("Comment not found".to_string())
}

fn load_comment<R>(comment_id: CommentId, repo: &R) -> ServiceResult<Comment>
where
    R: CommentReader,
{
    repo.get_comment_by_id(comment_id)
        .map_err(|e| ServiceError::from_repository("load comment", e))?
        .ok_or_else(comment_not_found)
}

fn run_listing<R>(query: CommentListQuery, repo: &R) -> ServiceResult<Vec<CommentDto>>
where
    R: CommentReader,
{
    match repo.list_comments(query) {
        Ok((_total, comments)) => Ok(comments.into_iter().map(CommentDto::from).collect()),
        Err(e) => Err(ServiceError::from_repository("list comments", e)),
    }
}

/// Comments of one post, newest first. An unknown post yields an empty list.
pub fn list_post_comments<R>(
    post_id: PostId,
    pagination: Pagination,
    repo: &R,
) -> ServiceResult<Vec<CommentDto>>
where
    R: CommentReader,
{
    let query = CommentListQuery::default()
        .post(post_id)
        .paginate(pagination.page, pagination.per_page);
    run_listing(query, repo)
}

pub fn list_comments<R>(payload: CommentListPayload, repo: &R) -> ServiceResult<Vec<CommentDto>>
where
    R: CommentReader,
{
    let query = CommentListQuery {
        post_id: payload.post_id,
        user_id: payload.user_id,
        pagination: Some(payload.pagination),
    };
    run_listing(query, repo)
}

/// Comment on a published post, optionally replying to a comment of the
/// same post.
pub fn create_comment<R>(
    post_id: PostId,
    payload: AddCommentFormPayload,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<CommentDto>
where
    R: PostReader + CommentReader + CommentWriter,
{
    let author = require_active(identity)?;

    let post = load_post(post_id, repo)?;
    if !post.post.is_published {
        return Err(ServiceError::Forbidden(
            "Cannot comment on unpublished post".to_string(),
        ));
    }

    if let Some(parent_id) = payload.parent_id {
        let parent = repo
            .get_comment_by_id(parent_id)
            .map_err(|e| ServiceError::from_repository("load parent comment", e))?;
        if parent.is_none_or(|parent| parent.post_id != post_id) {
            return Err(ServiceError::NotFound(
                "Parent comment not found".to_string(),
            ));
        }
    }

    let new_comment = payload.into_new_comment(post_id, author.id);
    match repo.create_comment(&new_comment) {
        Ok(details) => Ok(details.into()),
        Err(e) => Err(ServiceError::from_repository("create comment", e)),
    }
}

pub fn update_comment<R>(
    comment_id: CommentId,
    content: CommentContent,
    identity: &Identity,
    repo: &R,
) -> ServiceResult<CommentDto>
where
    R: CommentReader + CommentWriter,
{
    require_authenticated(identity)?;
    let comment = load_comment(comment_id, repo)?;
    require_owner_or_admin(identity, comment.user_id)?;

    match repo.update_comment(comment_id, &content) {
        Ok(details) => Ok(details.into()),
        Err(RepositoryError::NotFound) => Err(comment_not_found()),
        Err(e) => Err(ServiceError::from_repository("update comment", e)),
    }
}

/// Delete a comment and its replies.
pub fn delete_comment<R>(comment_id: CommentId, identity: &Identity, repo: &R) -> ServiceResult<()>
where
    R: CommentReader + CommentWriter,
{
    require_authenticated(identity)?;
    let comment = load_comment(comment_id, repo)?;
    require_owner_or_admin(identity, comment.user_id)?;

    match repo.delete_comment(comment_id) {
        Ok(true) => Ok(()),
        Ok(false) => Err(comment_not_found()),
        Err(e) => Err(ServiceError::from_repository("delete comment", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use crate::services::test_support::{identity_of, seed_post, seed_user};

    fn payload(content: &str, parent_id: Option<CommentId>) -> AddCommentFormPayload {
        AddCommentFormPayload {
            content: CommentContent::new(content).unwrap(),
            parent_id,
        }
    }

    #[test]
    fn comments_need_a_published_post() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);
        let draft = seed_post(&repo, &john, "Draft", false);

        assert_eq!(
            create_comment(draft.post.id, payload("Hi", None), &identity_of(&john), &repo)
                .unwrap_err(),
            ServiceError::Forbidden("Cannot comment on unpublished post".to_string())
        );
        assert_eq!(
            create_comment(
                PostId::new(99).unwrap(),
                payload("Hi", None),
                &identity_of(&john),
                &repo
            )
            .unwrap_err(),
            ServiceError::NotFound("Post not found".to_string())
        );
    }

    #[test]
    fn replies_stay_on_their_post() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);
        let first = seed_post(&repo, &john, "First", true);
        let second = seed_post(&repo, &john, "Second", true);
        let identity = identity_of(&john);

        let root = create_comment(first.post.id, payload("Root", None), &identity, &repo).unwrap();
        let root_id = CommentId::new(root.id).unwrap();

        let reply =
            create_comment(first.post.id, payload("Reply", Some(root_id)), &identity, &repo)
                .unwrap();
        assert_eq!(reply.parent_id, Some(root.id));

        assert!(matches!(
            create_comment(second.post.id, payload("Stray", Some(root_id)), &identity, &repo),
            Err(ServiceError::NotFound(_))
        ));

        let listed = list_post_comments(first.post.id, Pagination::default(), &repo).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].user.login, "john");
    }

    #[test]
    fn edits_are_owner_or_admin_only() {
        let repo = MemoryRepository::new();
        let admin = seed_user(&repo, "admin", true);
        let john = seed_user(&repo, "john", false);
        let jane = seed_user(&repo, "jane", false);
        let post = seed_post(&repo, &john, "Post", true);
        let comment =
            create_comment(post.post.id, payload("Nice", None), &identity_of(&jane), &repo)
                .unwrap();
        let id = CommentId::new(comment.id).unwrap();

        assert_eq!(
            update_comment(id, CommentContent::new("Edited").unwrap(), &identity_of(&john), &repo)
                .unwrap_err(),
            ServiceError::not_enough_permissions()
        );
        let edited =
            update_comment(id, CommentContent::new("Edited").unwrap(), &identity_of(&jane), &repo)
                .unwrap();
        assert_eq!(edited.content, "Edited");
        assert!(edited.is_edited);

        assert!(delete_comment(id, &identity_of(&admin), &repo).is_ok());
        assert_eq!(
            delete_comment(id, &identity_of(&admin), &repo).unwrap_err(),
            comment_not_found()
        );
    }

    #[test]
    fn listing_filters_by_author() {
        let repo = MemoryRepository::new();
        let john = seed_user(&repo, "john", false);
        let jane = seed_user(&repo, "jane", false);
        let post = seed_post(&repo, &john, "Post", true);
        create_comment(post.post.id, payload("A", None), &identity_of(&john), &repo).unwrap();
        create_comment(post.post.id, payload("B", None), &identity_of(&jane), &repo).unwrap();

        let by_jane = list_comments(
            CommentListPayload {
                post_id: None,
                user_id: Some(jane.id),
                pagination: Pagination::default(),
            },
            &repo,
        )
        .unwrap();
        assert_eq!(by_jane.len(), 1);
        assert_eq!(by_jane[0].content, "B");
    }
}
