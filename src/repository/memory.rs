//! In-process store implementing every repository trait.
//!
//! All collections live behind one mutex and every trait method takes the
//! lock exactly once, so each operation observes and leaves a consistent
//! state. The store can be snapshotted to and restored from a JSON file.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::comment::{Comment, CommentDetails, NewComment};
use crate::domain::post::{
    NewPost, Post, PostDetails, PostOrderBy, PostStats, PostUpdate, SortOrder,
};
use crate::domain::social::{FavoriteOutcome, FollowOutcome};
use crate::domain::stats::SiteTotals;
use crate::domain::types::{
    CategoryId, CommentContent, CommentId, Email, Login, PostId, Slug, UserId,
};
use crate::domain::user::{NewUser, User, UserStats, UserUpdate};
use crate::pagination::Pagination;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryListQuery, CategoryReader, CategoryWriter, CommentListQuery, CommentReader,
    CommentWriter, PostListQuery, PostReader, PostWriter, SocialReader, SocialWriter,
    StatsReader, UserListQuery, UserReader, UserWriter,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostCategoryLink {
    post_id: PostId,
    category_id: CategoryId,
    created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Favorite {
    user_id: UserId,
    post_id: PostId,
    created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Subscription {
    follower_id: UserId,
    following_id: UserId,
    created_at: NaiveDateTime,
}

/// Last identifier handed out per table.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct Sequences {
    users: i32,
    posts: i32,
    categories: i32,
    comments: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryState {
    users: Vec<User>,
    posts: Vec<Post>,
    categories: Vec<Category>,
    comments: Vec<Comment>,
    post_categories: Vec<PostCategoryLink>,
    favorites: Vec<Favorite>,
    subscriptions: Vec<Subscription>,
    sequences: Sequences,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn paginate<T>(items: Vec<T>, pagination: Option<&Pagination>) -> Vec<T> {
    match pagination {
        Some(pagination) => pagination.slice(items),
        None => items,
    }
}

impl MemoryState {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn post_details(&self, post: &Post) -> RepositoryResult<PostDetails> {
        let author = self
            .user(post.author_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        let mut categories: Vec<Category> = self
            .post_categories
            .iter()
            .filter(|link| link.post_id == post.id)
            .filter_map(|link| self.categories.iter().find(|c| c.id == link.category_id))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(PostDetails {
            post: post.clone(),
            author,
            categories,
        })
    }

    fn comment_details(&self, comment: &Comment) -> RepositoryResult<CommentDetails> {
        let user = self
            .user(comment.user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(CommentDetails {
            comment: comment.clone(),
            user,
        })
    }

    fn check_user_unique(
        &self,
        email: Option<&Email>,
        login: Option<&Login>,
        except: Option<UserId>,
    ) -> RepositoryResult<()> {
        let others = || self.users.iter().filter(|u| Some(u.id) != except);
        if let Some(email) = email
            && others().any(|u| &u.email == email)
        {
            return Err(RepositoryError::Duplicate("email".to_string()));
        }
        if let Some(login) = login
            && others().any(|u| &u.login == login)
        {
            return Err(RepositoryError::Duplicate("login".to_string()));
        }
        Ok(())
    }

    fn check_category_unique(
        &self,
        name: Option<&str>,
        slug: Option<&Slug>,
        except: Option<CategoryId>,
    ) -> RepositoryResult<()> {
        let others = || self.categories.iter().filter(|c| Some(c.id) != except);
        if let Some(name) = name
            && others().any(|c| c.name.as_str() == name)
        {
            return Err(RepositoryError::Duplicate("name".to_string()));
        }
        if let Some(slug) = slug
            && others().any(|c| &c.slug == slug)
        {
            return Err(RepositoryError::Duplicate("slug".to_string()));
        }
        Ok(())
    }

    fn link_categories(&mut self, post_id: PostId, ids: &[CategoryId], now: NaiveDateTime) {
        self.post_categories.retain(|link| link.post_id != post_id);
        for id in ids {
            let known = self.categories.iter().any(|c| c.id == *id);
            let linked = self
                .post_categories
                .iter()
                .any(|link| link.post_id == post_id && link.category_id == *id);
            if known && !linked {
                self.post_categories.push(PostCategoryLink {
                    post_id,
                    category_id: *id,
                    created_at: now,
                });
            }
        }
    }

    /// Remove comments matching `doomed` and, transitively, their replies.
    fn delete_comments_where(&mut self, doomed: impl Fn(&Comment) -> bool) -> usize {
        let mut removed: Vec<CommentId> = self
            .comments
            .iter()
            .filter(|c| doomed(c))
            .map(|c| c.id)
            .collect();
        let mut cursor = 0;
        while cursor < removed.len() {
            let parent = removed[cursor];
            for reply in self.comments.iter().filter(|c| c.parent_id == Some(parent)) {
                if !removed.contains(&reply.id) {
                    removed.push(reply.id);
                }
            }
            cursor += 1;
        }
        self.comments.retain(|c| !removed.contains(&c.id));
        removed.len()
    }

    fn delete_posts_where(&mut self, doomed: impl Fn(&Post) -> bool) -> usize {
        let removed: Vec<PostId> = self
            .posts
            .iter()
            .filter(|p| doomed(p))
            .map(|p| p.id)
            .collect();
        self.posts.retain(|p| !removed.contains(&p.id));
        self.post_categories
            .retain(|link| !removed.contains(&link.post_id));
        self.favorites.retain(|f| !removed.contains(&f.post_id));
        self.delete_comments_where(|c| removed.contains(&c.post_id));
        removed.len()
    }
}

/// Mutex-guarded in-memory repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::ConnectionError("memory store lock poisoned".to_string()))
    }

    /// Write every collection and the id sequences to `path` as pretty JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> RepositoryResult<()> {
        let state = self.lock()?;
        let json = serde_json::to_string_pretty(&*state)
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        fs::write(path, json).map_err(|e| RepositoryError::DatabaseError(e.to_string()))
    }

    /// Restore a store saved with [`save_to_path`](Self::save_to_path).
    /// A missing file yields an empty store.
    pub fn load_from_path(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw =
            fs::read_to_string(path).map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        let state: MemoryState = serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;
        Ok(Self {
            state: Mutex::new(state),
        })
    }
}

impl UserReader for MemoryRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.lock()?.user(id).cloned())
    }

    fn get_user_by_email(&self, email: &Email) -> RepositoryResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    fn get_user_by_login(&self, login: &Login) -> RepositoryResult<Option<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| &u.login == login)
            .cloned())
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        let state = self.lock()?;
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut items: Vec<User> = state
            .users
            .iter()
            .filter(|u| query.is_active.is_none_or(|active| u.is_active == active))
            .filter(|u| {
                search.as_deref().is_none_or(|s| {
                    contains_ci(u.login.as_str(), s)
                        || contains_ci(u.email.as_str(), s)
                        || u.full_name.as_deref().is_some_and(|n| contains_ci(n, s))
                })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = items.len();
        Ok((total, paginate(items, query.pagination.as_ref())))
    }

    fn get_user_stats(&self, id: UserId) -> RepositoryResult<UserStats> {
        let state = self.lock()?;
        let count = |n: usize| n as i64;
        Ok(UserStats {
            posts_count: count(state.posts.iter().filter(|p| p.author_id == id).count()),
            followers_count: count(
                state
                    .subscriptions
                    .iter()
                    .filter(|s| s.following_id == id)
                    .count(),
            ),
            following_count: count(
                state
                    .subscriptions
                    .iter()
                    .filter(|s| s.follower_id == id)
                    .count(),
            ),
        })
    }
}

impl UserWriter for MemoryRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.lock()?;
        state.check_user_unique(Some(&user.email), Some(&user.login), None)?;

        let id = UserId::new(next_id(&mut state.sequences.users))?;
        let created = User {
            id,
            email: user.email.clone(),
            login: user.login.clone(),
            password_hash: user.password_hash.clone(),
            full_name: user.full_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> RepositoryResult<User> {
        let mut state = self.lock()?;
        state.check_user_unique(update.email.as_ref(), update.login.as_ref(), Some(id))?;

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if let Some(login) = &update.login {
            user.login = login.clone();
        }
        if let Some(password_hash) = &update.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(full_name) = &update.full_name {
            user.full_name = Some(full_name.clone());
        }
        if let Some(bio) = &update.bio {
            user.bio = Some(bio.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(is_admin) = update.is_admin {
            user.is_admin = is_admin;
        }
        user.updated_at = Utc::now().naive_utc();
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(false);
        }

        state.delete_posts_where(|p| p.author_id == id);
        state.delete_comments_where(|c| c.user_id == id);
        state.favorites.retain(|f| f.user_id != id);
        state
            .subscriptions
            .retain(|s| s.follower_id != id && s.following_id != id);
        Ok(true)
    }
}

impl PostReader for MemoryRepository {
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostDetails>)> {
        let state = self.lock()?;
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut items: Vec<&Post> = state
            .posts
            .iter()
            .filter(|p| !query.published_only || p.is_published)
            .filter(|p| query.author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| {
                query
                    .author_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&p.author_id))
            })
            .filter(|p| {
                query.category_id.is_none_or(|category_id| {
                    state
                        .post_categories
                        .iter()
                        .any(|link| link.post_id == p.id && link.category_id == category_id)
                })
            })
            .filter(|p| {
                search.as_deref().is_none_or(|s| {
                    contains_ci(p.title.as_str(), s)
                        || contains_ci(p.content.as_str(), s)
                        || p.summary.as_deref().is_some_and(|summary| contains_ci(summary, s))
                })
            })
            .collect();

        items.sort_by(|a, b| {
            let by_column = match query.order_by {
                PostOrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
                PostOrderBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                PostOrderBy::ViewCount => a.view_count.cmp(&b.view_count),
                PostOrderBy::Title => a.title.as_str().cmp(b.title.as_str()),
            };
            let ordering = by_column.then(a.id.cmp(&b.id));
            match query.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = items.len();
        let items = paginate(items, query.pagination.as_ref())
            .into_iter()
            .map(|p| state.post_details(p))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok((total, items))
    }

    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<PostDetails>> {
        let state = self.lock()?;
        state.post(id).map(|p| state.post_details(p)).transpose()
    }

    fn get_post_by_slug(&self, slug: &str) -> RepositoryResult<Option<PostDetails>> {
        let state = self.lock()?;
        state
            .posts
            .iter()
            .find(|p| p.slug.as_str() == slug)
            .map(|p| state.post_details(p))
            .transpose()
    }

    fn get_post_stats(&self, id: PostId) -> RepositoryResult<PostStats> {
        let state = self.lock()?;
        Ok(PostStats {
            likes_count: state.favorites.iter().filter(|f| f.post_id == id).count() as i64,
            comments_count: state.comments.iter().filter(|c| c.post_id == id).count() as i64,
        })
    }
}

impl PostWriter for MemoryRepository {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<PostDetails> {
        let mut state = self.lock()?;
        if state.user(post.author_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let slug = post.slug();
        if state.posts.iter().any(|p| p.slug == slug) {
            return Err(RepositoryError::Duplicate("slug".to_string()));
        }

        let id = PostId::new(next_id(&mut state.sequences.posts))?;
        let created = Post {
            id,
            author_id: post.author_id,
            title: post.title.clone(),
            slug,
            content: post.content.clone(),
            summary: post.summary.clone(),
            is_published: post.is_published,
            published_at: post.published_at(),
            view_count: 0,
            created_at: post.created_at,
            updated_at: post.created_at,
        };
        state.posts.push(created.clone());
        state.link_categories(id, &post.category_ids, post.created_at);
        state.post_details(&created)
    }

    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<PostDetails> {
        let mut state = self.lock()?;
        let now = Utc::now().naive_utc();

        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        post.published_at = update.published_at(post.published_at, now);
        if let Some(title) = &update.title {
            post.title = title.clone();
        }
        if let Some(content) = &update.content {
            post.content = content.clone();
        }
        if let Some(summary) = &update.summary {
            post.summary = Some(summary.clone());
        }
        if let Some(is_published) = update.is_published {
            post.is_published = is_published;
        }
        post.updated_at = now;
        let updated = post.clone();

        if let Some(category_ids) = &update.category_ids {
            state.link_categories(id, category_ids, now);
        }
        state.post_details(&updated)
    }

    fn delete_post(&self, id: PostId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        Ok(state.delete_posts_where(|p| p.id == id) > 0)
    }

    fn increment_post_views(&self, id: PostId) -> RepositoryResult<usize> {
        let mut state = self.lock()?;
        match state.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.view_count += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl CategoryReader for MemoryRepository {
    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        let state = self.lock()?;
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut items: Vec<Category> = state
            .categories
            .iter()
            .filter(|c| {
                search.as_deref().is_none_or(|s| {
                    contains_ci(c.name.as_str(), s)
                        || contains_ci(c.slug.as_str(), s)
                        || c.description.as_deref().is_some_and(|d| contains_ci(d, s))
                })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = items.len();
        Ok((total, paginate(items, query.pagination.as_ref())))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .find(|c| c.slug.as_str() == slug)
            .cloned())
    }
}

impl CategoryWriter for MemoryRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.lock()?;
        state.check_category_unique(Some(category.name.as_str()), Some(&category.slug), None)?;

        let id = CategoryId::new(next_id(&mut state.sequences.categories))?;
        let created = Category {
            id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            created_at: category.created_at,
        };
        state.categories.push(created.clone());
        Ok(created)
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category> {
        let mut state = self.lock()?;
        state.check_category_unique(
            update.name.as_ref().map(|n| n.as_str()),
            update.slug.as_ref(),
            Some(id),
        )?;

        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = &update.name {
            category.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            category.slug = slug.clone();
        }
        if let Some(description) = &update.description {
            category.description = Some(description.clone());
        }
        Ok(category.clone())
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        state.post_categories.retain(|link| link.category_id != id);
        Ok(state.categories.len() < before)
    }
}

impl CommentReader for MemoryRepository {
    fn list_comments(
        &self,
        query: CommentListQuery,
    ) -> RepositoryResult<(usize, Vec<CommentDetails>)> {
        let state = self.lock()?;

        let mut items: Vec<&Comment> = state
            .comments
            .iter()
            .filter(|c| query.post_id.is_none_or(|id| c.post_id == id))
            .filter(|c| query.user_id.is_none_or(|id| c.user_id == id))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = items.len();
        let items = paginate(items, query.pagination.as_ref())
            .into_iter()
            .map(|c| state.comment_details(c))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok((total, items))
    }

    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        Ok(self
            .lock()?
            .comments
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }
}

impl CommentWriter for MemoryRepository {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<CommentDetails> {
        let mut state = self.lock()?;
        let parent_known = comment
            .parent_id
            .is_none_or(|parent| state.comments.iter().any(|c| c.id == parent));
        if state.post(comment.post_id).is_none()
            || state.user(comment.user_id).is_none()
            || !parent_known
        {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }

        let id = CommentId::new(next_id(&mut state.sequences.comments))?;
        let created = Comment {
            id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content.clone(),
            parent_id: comment.parent_id,
            is_edited: false,
            created_at: comment.created_at,
            updated_at: comment.created_at,
        };
        state.comments.push(created.clone());
        state.comment_details(&created)
    }

    fn update_comment(
        &self,
        id: CommentId,
        content: &CommentContent,
    ) -> RepositoryResult<CommentDetails> {
        let mut state = self.lock()?;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        comment.content = content.clone();
        comment.is_edited = true;
        comment.updated_at = Utc::now().naive_utc();
        let updated = comment.clone();
        state.comment_details(&updated)
    }

    fn delete_comment(&self, id: CommentId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        Ok(state.delete_comments_where(|c| c.id == id) > 0)
    }
}

impl SocialReader for MemoryRepository {
    fn is_favorited(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool> {
        Ok(self
            .lock()?
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.post_id == post_id))
    }

    fn list_favorite_posts(
        &self,
        user_id: UserId,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<PostDetails>)> {
        let state = self.lock()?;

        let mut favorites: Vec<&Favorite> = state
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .collect();
        favorites.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.post_id.cmp(&a.post_id))
        });

        let total = favorites.len();
        let items = paginate(favorites, pagination.as_ref())
            .into_iter()
            .filter_map(|f| state.post(f.post_id))
            .map(|p| state.post_details(p))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok((total, items))
    }

    fn is_following(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool> {
        Ok(self
            .lock()?
            .subscriptions
            .iter()
            .any(|s| s.follower_id == follower_id && s.following_id == following_id))
    }

    fn list_following(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let state = self.lock()?;
        let mut users: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|s| s.follower_id == user_id)
            .filter_map(|s| state.user(s.following_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(users)
    }

    fn list_followers(&self, user_id: UserId) -> RepositoryResult<Vec<User>> {
        let state = self.lock()?;
        let mut users: Vec<User> = state
            .subscriptions
            .iter()
            .filter(|s| s.following_id == user_id)
            .filter_map(|s| state.user(s.follower_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(users)
    }
}

impl SocialWriter for MemoryRepository {
    fn add_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<FavoriteOutcome> {
        let mut state = self.lock()?;
        if state.user(user_id).is_none() || state.post(post_id).is_none() {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        if state
            .favorites
            .iter()
            .any(|f| f.user_id == user_id && f.post_id == post_id)
        {
            return Ok(FavoriteOutcome::AlreadyFavorited);
        }
        state.favorites.push(Favorite {
            user_id,
            post_id,
            created_at: Utc::now().naive_utc(),
        });
        Ok(FavoriteOutcome::Added)
    }

    fn remove_favorite(&self, user_id: UserId, post_id: PostId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|f| !(f.user_id == user_id && f.post_id == post_id));
        Ok(state.favorites.len() < before)
    }

    fn follow_user(
        &self,
        follower_id: UserId,
        following_id: UserId,
    ) -> RepositoryResult<FollowOutcome> {
        if follower_id == following_id {
            return Ok(FollowOutcome::SelfFollow);
        }
        let mut state = self.lock()?;
        if state.user(follower_id).is_none() || state.user(following_id).is_none() {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        if state
            .subscriptions
            .iter()
            .any(|s| s.follower_id == follower_id && s.following_id == following_id)
        {
            return Ok(FollowOutcome::AlreadyFollowing);
        }
        state.subscriptions.push(Subscription {
            follower_id,
            following_id,
            created_at: Utc::now().naive_utc(),
        });
        Ok(FollowOutcome::Followed)
    }

    fn unfollow_user(&self, follower_id: UserId, following_id: UserId) -> RepositoryResult<bool> {
        let mut state = self.lock()?;
        let before = state.subscriptions.len();
        state
            .subscriptions
            .retain(|s| !(s.follower_id == follower_id && s.following_id == following_id));
        Ok(state.subscriptions.len() < before)
    }
}

impl StatsReader for MemoryRepository {
    fn site_totals(&self, recent_since: NaiveDateTime) -> RepositoryResult<SiteTotals> {
        let state = self.lock()?;
        Ok(SiteTotals {
            total_users: state.users.len() as i64,
            total_posts: state.posts.len() as i64,
            total_comments: state.comments.len() as i64,
            recent_users: state
                .users
                .iter()
                .filter(|u| u.created_at >= recent_since)
                .count() as i64,
        })
    }
}
