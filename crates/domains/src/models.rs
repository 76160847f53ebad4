//! # Domain Models
//!
//! These structs represent the core entities of the social graph.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! Relationship edges are stored twice, once on each endpoint:
//! `User::following` mirrors `User::followers` of the other user, and
//! `User::liked_posts` mirrors `Post::likes`. Neither side is authoritative
//! on its own; see `crate::invariants` for the checks that compare them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque profile fields. The core never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub bio: Option<String>,
    pub link: Option<String>,
    /// Reference handed out by the external media host
    pub profile_img: Option<String>,
    pub cover_img: Option<String>,
}

/// A registered account as stored in the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Owned by the auth collaborator. Never read or written by the core.
    pub password_hash: String,
    pub profile: Profile,
    /// Users this user follows
    pub following: BTreeSet<Uuid>,
    /// Users following this user
    pub followers: BTreeSet<Uuid>,
    /// Mirror of `Post::likes`
    pub liked_posts: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_following(&self, other: Uuid) -> bool {
        self.following.contains(&other)
    }
}

/// Input for `UserRepository::create_user`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// A user with credential fields removed. This is the only user shape that
/// leaves the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile: Profile,
    pub following: BTreeSet<Uuid>,
    pub followers: BTreeSet<Uuid>,
    pub liked_posts: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            profile: user.profile,
            following: user.following,
            followers: user.followers,
            liked_posts: user.liked_posts,
            created_at: user.created_at,
        }
    }
}

/// A single comment. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The fundamental unit of publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: Option<String>,
    /// Path or ID of the media handled by the external media host
    pub media: Option<String>,
    /// Mirror of `User::liked_posts`
    pub likes: BTreeSet<Uuid>,
    /// Append-only; insertion order is display order
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Input for `PostRepository::create_post`.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub text: Option<String>,
    pub media: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Like,
}

/// Created once per follow-edge or like-edge creation. Only `read` ever
/// changes, and only from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for `NotificationRepository::create_notification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub from: Uuid,
    pub to: Uuid,
    pub kind: NotificationKind,
}

/// Result of a follow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowState {
    Followed,
    Unfollowed,
}

/// Result of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeState {
    Liked,
    Unliked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub state: LikeState,
    pub like_count: usize,
}
