//! # Store Ports
//!
//! Any storage adapter must implement these traits to be used by the services.
//!
//! The contract mirrors a document store: every method touches exactly one
//! document atomically, set updates are idempotent, and there is no
//! multi-document transaction. Services are written against that limitation.

use async_trait::async_trait;
use uuid::Uuid;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::error::Result;
use crate::models::{Comment, NewNotification, NewPost, NewUser, Notification, Post, User};

/// Set-valued fields of a `User` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserSet {
    Following,
    Followers,
    LikedPosts,
}

impl UserSet {
    pub fn field_name(&self) -> &'static str {
        match self {
            UserSet::Following => "following",
            UserSet::Followers => "followers",
            UserSet::LikedPosts => "likedPosts",
        }
    }
}

/// Persistence contract for users.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Fails with `DomainError::Conflict` if the username or email is taken
    /// (compared case-insensitively).
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Adds `value` to the named set. Adding an existing member is a no-op.
    /// Returns the set's cardinality after the update.
    async fn add_to_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize>;

    /// Removes `value` from the named set. Removing an absent member is a no-op.
    /// Returns the set's cardinality after the update.
    async fn remove_from_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize>;

    /// Uniform random sample of at most `n` users, never including `exclude`.
    async fn sample_users(&self, exclude: Uuid, n: usize) -> Result<Vec<User>>;

    /// Full scan, used by the consistency audit.
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Persistence contract for posts and their embedded comments.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>>;

    async fn create_post(&self, new_post: NewPost) -> Result<Post>;

    /// Returns `true` if a post was removed.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;

    /// Adds `user_id` to `likes`, returning the resulting like count.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize>;

    /// Removes `user_id` from `likes`, returning the resulting like count.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize>;

    /// Appends to `comments` preserving order and returns the updated post.
    async fn append_comment(&self, post_id: Uuid, comment: Comment) -> Result<Post>;

    /// Posts with the given ids; missing ids are skipped.
    async fn get_posts(&self, ids: Vec<Uuid>) -> Result<Vec<Post>>;

    /// Every post, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;
}

/// Persistence contract for notifications.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification>;

    /// Notifications addressed to `to`, newest first.
    async fn list_for(&self, to: Uuid) -> Result<Vec<Notification>>;

    /// Sets `read = true` on the listed notifications addressed to `to`.
    /// Ids that are unknown or addressed elsewhere are ignored.
    /// Returns how many changed state.
    async fn mark_read(&self, to: Uuid, ids: Vec<Uuid>) -> Result<usize>;

    /// Returns how many were removed.
    async fn delete_all_for(&self, to: Uuid) -> Result<usize>;
}
