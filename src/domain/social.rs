use serde::{Deserialize, Serialize};

/// Result of favoriting a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    /// The pair already existed; nothing was written.
    AlreadyFavorited,
}

/// Result of following a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    SelfFollow,
}
