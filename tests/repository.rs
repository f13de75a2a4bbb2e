use blog_backend::domain::category::NewCategory;
use blog_backend::domain::comment::NewComment;
use blog_backend::domain::post::{NewPost, PostDetails, PostOrderBy, PostUpdate, SortOrder};
use blog_backend::domain::social::{FavoriteOutcome, FollowOutcome};
use blog_backend::domain::types::{
    CategoryName, CommentContent, Email, Login, PasswordHash, PostContent, PostId, PostTitle,
    Slug,
};
use blog_backend::domain::user::{NewUser, User, UserUpdate};
use blog_backend::repository::errors::RepositoryError;
use blog_backend::repository::{
    CategoryReader, CategoryWriter, CommentListQuery, CommentReader, CommentWriter,
    DieselRepository, PostListQuery, PostReader, PostWriter, SocialReader, SocialWriter,
    StatsReader, UserListQuery, UserReader, UserWriter,
};
use chrono::{Duration, Utc};
use std::sync::Barrier;

mod common;

fn new_user(login: &str, full_name: Option<&str>) -> NewUser {
    let now = Utc::now().naive_utc();
    NewUser {
        email: Email::new(format!("{login}@example.com")).unwrap(),
        login: Login::new(login).unwrap(),
        password_hash: PasswordHash::new("$argon2id$stub").unwrap(),
        full_name: full_name.map(str::to_string),
        bio: None,
        avatar_url: None,
        is_active: true,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

fn create_user(repo: &DieselRepository, login: &str) -> User {
    repo.create_user(&new_user(login, None)).unwrap()
}

fn create_post(
    repo: &DieselRepository,
    author: &User,
    title: &str,
    published: bool,
) -> PostDetails {
    repo.create_post(&NewPost {
        author_id: author.id,
        title: PostTitle::new(title).unwrap(),
        content: PostContent::new(format!("{title} content")).unwrap(),
        summary: None,
        is_published: published,
        category_ids: vec![],
        created_at: Utc::now().naive_utc(),
    })
    .unwrap()
}

#[test]
fn duplicate_email_or_login_is_rejected() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    create_user(&repo, "john");

    let mut same_login = new_user("john", None);
    same_login.email = Email::new("other@example.com").unwrap();
    assert!(matches!(
        repo.create_user(&same_login),
        Err(RepositoryError::Duplicate(field)) if field == "login"
    ));

    let mut same_email = new_user("johnny", None);
    same_email.email = Email::new("john@example.com").unwrap();
    assert!(matches!(
        repo.create_user(&same_email),
        Err(RepositoryError::Duplicate(field)) if field == "email"
    ));
}

#[test]
fn concurrent_signups_with_same_email_yield_one_user() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let barrier = Barrier::new(2);

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["racer_one", "racer_two"]
            .into_iter()
            .map(|login| {
                let repo = &repo;
                let barrier = &barrier;
                scope.spawn(move || {
                    let mut user = new_user(login, None);
                    user.email = Email::new("shared@example.com").unwrap();
                    barrier.wait();
                    repo.create_user(&user)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(RepositoryError::Duplicate(field)) if field == "email"))
    );
    let (total, _) = repo.list_users(UserListQuery::default()).unwrap();
    assert_eq!(total, 1);
}

#[test]
fn deleting_user_cascades() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    let johns_post = create_post(&repo, &john, "John's post", true);
    let janes_post = create_post(&repo, &jane, "Jane's post", true);

    let comment = repo
        .create_comment(&NewComment {
            post_id: janes_post.post.id,
            user_id: john.id,
            content: CommentContent::new("Nice").unwrap(),
            parent_id: None,
            created_at: Utc::now().naive_utc(),
        })
        .unwrap();
    repo.add_favorite(jane.id, johns_post.post.id).unwrap();
    repo.follow_user(jane.id, john.id).unwrap();

    assert!(repo.delete_user(john.id).unwrap());
    assert!(!repo.delete_user(john.id).unwrap());

    assert!(repo.get_user_by_id(john.id).unwrap().is_none());
    assert!(repo.get_post_by_id(johns_post.post.id).unwrap().is_none());
    assert!(repo.get_comment_by_id(comment.comment.id).unwrap().is_none());
    assert!(!repo.is_favorited(jane.id, johns_post.post.id).unwrap());
    assert!(repo.list_following(jane.id).unwrap().is_empty());
    assert!(repo.get_post_by_id(janes_post.post.id).unwrap().is_some());
}

#[test]
fn published_at_is_stamped_once() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let draft = create_post(&repo, &john, "Draft", false);
    assert!(draft.post.published_at.is_none());

    let publish = PostUpdate {
        is_published: Some(true),
        ..Default::default()
    };
    let published = repo.update_post(draft.post.id, &publish).unwrap();
    let stamp = published.post.published_at.expect("published_at set on publish");

    let unpublish = PostUpdate {
        is_published: Some(false),
        ..Default::default()
    };
    repo.update_post(draft.post.id, &unpublish).unwrap();
    let republished = repo.update_post(draft.post.id, &publish).unwrap();
    assert_eq!(republished.post.published_at, Some(stamp));
}

#[test]
fn follow_and_favorite_are_idempotent() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    let post = create_post(&repo, &jane, "Post", true);

    assert_eq!(repo.follow_user(john.id, jane.id).unwrap(), FollowOutcome::Followed);
    assert_eq!(
        repo.follow_user(john.id, jane.id).unwrap(),
        FollowOutcome::AlreadyFollowing
    );
    assert_eq!(repo.follow_user(john.id, john.id).unwrap(), FollowOutcome::SelfFollow);
    assert_eq!(repo.list_followers(jane.id).unwrap().len(), 1);

    assert_eq!(repo.add_favorite(john.id, post.post.id).unwrap(), FavoriteOutcome::Added);
    assert_eq!(
        repo.add_favorite(john.id, post.post.id).unwrap(),
        FavoriteOutcome::AlreadyFavorited
    );
    assert_eq!(repo.get_post_stats(post.post.id).unwrap().likes_count, 1);

    assert!(repo.remove_favorite(john.id, post.post.id).unwrap());
    assert!(!repo.remove_favorite(john.id, post.post.id).unwrap());
    assert!(repo.unfollow_user(john.id, jane.id).unwrap());
    assert!(!repo.unfollow_user(john.id, jane.id).unwrap());
}

#[test]
fn search_matches_login_and_full_name() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_user(&new_user("jdoe", Some("John Doe"))).unwrap();
    repo.create_user(&new_user("bob", Some("Bob Johnson"))).unwrap();
    repo.create_user(&new_user("alice", Some("Alice Smith"))).unwrap();

    let (total, users) = repo.list_users(UserListQuery::default().search("john")).unwrap();
    assert_eq!(total, 2);
    let mut names: Vec<_> = users.iter().filter_map(|u| u.full_name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Bob Johnson", "John Doe"]);
}

#[test]
fn pagination_walks_all_posts_without_overlap() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    for i in 0..45 {
        create_post(&repo, &john, &format!("Post {i}"), true);
    }

    let mut seen: Vec<PostId> = Vec::new();
    let mut sizes = Vec::new();
    for page in 1..=3 {
        let (total, posts) = repo
            .list_posts(PostListQuery::default().published().paginate(page, 20))
            .unwrap();
        assert_eq!(total, 45);
        sizes.push(posts.len());
        seen.extend(posts.iter().map(|p| p.post.id));
    }

    assert_eq!(sizes, vec![20, 20, 5]);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 45);
}

#[test]
fn post_round_trip_and_partial_update() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let rust = repo
        .create_category(&NewCategory {
            name: CategoryName::new("Rust").unwrap(),
            slug: Slug::new("rust").unwrap(),
            description: None,
            created_at: Utc::now().naive_utc(),
        })
        .unwrap();

    let created = repo
        .create_post(&NewPost {
            author_id: john.id,
            title: PostTitle::new("Ownership explained").unwrap(),
            content: PostContent::new("Borrowing rules").unwrap(),
            summary: Some("Short".to_string()),
            is_published: true,
            category_ids: vec![rust.id],
            created_at: Utc::now().naive_utc(),
        })
        .unwrap();

    let loaded = repo
        .get_post_by_slug(created.post.slug.as_str())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.post.title, created.post.title);
    assert_eq!(loaded.author.login, john.login);
    assert_eq!(loaded.categories.len(), 1);
    assert_eq!(loaded.categories[0].slug, "rust");

    let (total, in_rust) = repo
        .list_posts(PostListQuery::default().category(rust.id))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(in_rust[0].post.id, created.post.id);

    let retitle = PostUpdate {
        title: Some(PostTitle::new("Ownership, revisited").unwrap()),
        ..Default::default()
    };
    let updated = repo.update_post(created.post.id, &retitle).unwrap();
    assert_eq!(updated.post.title, "Ownership, revisited");
    assert_eq!(updated.post.content, "Borrowing rules");
    assert_eq!(updated.post.slug, created.post.slug);
    assert_eq!(updated.categories.len(), 1);
}

#[test]
fn feed_query_filters_by_authors() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    let bob = create_user(&repo, "bob");
    create_post(&repo, &john, "John", true);
    create_post(&repo, &jane, "Jane", true);
    create_post(&repo, &bob, "Bob", true);

    let (total, posts) = repo
        .list_posts(
            PostListQuery::default()
                .published()
                .authors(vec![john.id, jane.id]),
        )
        .unwrap();
    assert_eq!(total, 2);
    assert!(posts.iter().all(|p| p.post.author_id != bob.id));
}

#[test]
fn comments_list_and_update() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let post = create_post(&repo, &john, "Post", true);
    let root = repo
        .create_comment(&NewComment {
            post_id: post.post.id,
            user_id: john.id,
            content: CommentContent::new("Root").unwrap(),
            parent_id: None,
            created_at: Utc::now().naive_utc(),
        })
        .unwrap();
    repo.create_comment(&NewComment {
        post_id: post.post.id,
        user_id: john.id,
        content: CommentContent::new("Reply").unwrap(),
        parent_id: Some(root.comment.id),
        created_at: Utc::now().naive_utc(),
    })
    .unwrap();

    let (total, comments) = repo
        .list_comments(CommentListQuery::default().post(post.post.id))
        .unwrap();
    assert_eq!(total, 2);
    assert!(comments.iter().all(|c| c.user.id == john.id));

    let edited = repo
        .update_comment(root.comment.id, &CommentContent::new("Edited").unwrap())
        .unwrap();
    assert!(edited.comment.is_edited);
    assert_eq!(edited.comment.content, "Edited");

    assert!(repo.delete_comment(root.comment.id).unwrap());
    let (total, _) = repo
        .list_comments(CommentListQuery::default().post(post.post.id))
        .unwrap();
    assert_eq!(total, 0);
}

#[test]
fn user_update_and_stats() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    create_post(&repo, &john, "Post", true);
    repo.follow_user(jane.id, john.id).unwrap();

    let updated = repo
        .update_user(
            john.id,
            &UserUpdate {
                bio: Some("Writes about Rust".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Writes about Rust"));
    assert_eq!(updated.email, john.email);

    let stats = repo.get_user_stats(john.id).unwrap();
    assert_eq!(stats.posts_count, 1);
    assert_eq!(stats.followers_count, 1);
    assert_eq!(stats.following_count, 0);

    let totals = repo
        .site_totals(Utc::now().naive_utc() - Duration::days(7))
        .unwrap();
    assert_eq!(totals.total_users, 2);
    assert_eq!(totals.total_posts, 1);
    assert_eq!(totals.recent_users, 2);
}

#[test]
fn category_is_found_by_slug() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let rust = repo
        .create_category(&NewCategory {
            name: CategoryName::new("Rust").unwrap(),
            slug: Slug::new("rust").unwrap(),
            description: None,
            created_at: Utc::now().naive_utc(),
        })
        .unwrap();

    let found = repo.get_category_by_slug("rust").unwrap().unwrap();
    assert_eq!(found.id, rust.id);
    assert!(repo.get_category_by_slug("go").unwrap().is_none());
}

#[test]
fn follow_state_is_directional() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    repo.follow_user(jane.id, john.id).unwrap();

    assert!(repo.is_following(jane.id, john.id).unwrap());
    assert!(!repo.is_following(john.id, jane.id).unwrap());

    repo.unfollow_user(jane.id, john.id).unwrap();
    assert!(!repo.is_following(jane.id, john.id).unwrap());
}

#[test]
fn users_filter_by_active_flag() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let jane = create_user(&repo, "jane");
    repo.update_user(
        jane.id,
        &UserUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .unwrap();

    let (total, active) = repo.list_users(UserListQuery::default().active(true)).unwrap();
    assert_eq!(total, 1);
    assert_eq!(active[0].id, john.id);

    let (_, inactive) = repo.list_users(UserListQuery::default().active(false)).unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, jane.id);
}

#[test]
fn posts_order_by_title_and_views() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let john = create_user(&repo, "john");
    let banana = create_post(&repo, &john, "Banana", true);
    let apple = create_post(&repo, &john, "Apple", true);
    let cherry = create_post(&repo, &john, "Cherry", true);
    repo.increment_post_views(cherry.post.id).unwrap();
    repo.increment_post_views(cherry.post.id).unwrap();
    repo.increment_post_views(banana.post.id).unwrap();

    let ids = |query: PostListQuery| -> Vec<PostId> {
        let (_, posts) = repo.list_posts(query).unwrap();
        posts.into_iter().map(|p| p.post.id).collect()
    };

    assert_eq!(
        ids(PostListQuery::default().order(PostOrderBy::Title, SortOrder::Asc)),
        vec![apple.post.id, banana.post.id, cherry.post.id]
    );
    assert_eq!(
        ids(PostListQuery::default().order(PostOrderBy::ViewCount, SortOrder::Desc)),
        vec![cherry.post.id, banana.post.id, apple.post.id]
    );
}
