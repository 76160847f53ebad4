//! # MemoryStore
//!
//! In-process implementation of the store ports. Each collection is a
//! `DashMap`, so every port method locks exactly one document shard and is
//! atomic for that document, and nothing spans two documents. That matches
//! the document-store contract the services are written against.
//!
//! Username and email uniqueness is enforced through two lower-cased index
//! maps reserved with `entry()` before the user document is inserted.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    Comment, DomainError, NewNotification, NewPost, NewUser, Notification,
    NotificationRepository, Post, PostRepository, Result, User, UserRepository, UserSet,
};
use rand::seq::SliceRandom;
use tracing::debug;
use uuid::Uuid;

use crate::snapshot::{Snapshot, SnapshotError};

#[derive(Default)]
struct Collections {
    users: DashMap<Uuid, User>,
    usernames: DashMap<String, Uuid>,
    emails: DashMap<String, Uuid>,
    posts: DashMap<Uuid, Post>,
    notifications: DashMap<Uuid, Notification>,
}

/// Cheap to clone; clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Collections>,
}

fn index_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn user_set_mut(user: &mut User, field: UserSet) -> &mut BTreeSet<Uuid> {
    match field {
        UserSet::Following => &mut user.following,
        UserSet::Followers => &mut user.followers,
        UserSet::LikedPosts => &mut user.liked_posts,
    }
}

fn newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (chrono::DateTime<Utc>, Uuid),
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every collection into a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let mut users: Vec<User> = self.inner.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        let mut posts: Vec<Post> = self.inner.posts.iter().map(|e| e.value().clone()).collect();
        posts.sort_by_key(|p| p.id);
        let mut notifications: Vec<Notification> = self
            .inner
            .notifications
            .iter()
            .map(|e| e.value().clone())
            .collect();
        notifications.sort_by_key(|n| n.id);

        Snapshot {
            users,
            posts,
            notifications,
        }
    }

    /// Rebuilds a store, including its uniqueness indexes, from a snapshot.
    pub fn restore(snapshot: Snapshot) -> std::result::Result<Self, SnapshotError> {
        let store = Self::new();

        for user in snapshot.users {
            for (index, key, field) in [
                (&store.inner.usernames, index_key(&user.username), "username"),
                (&store.inner.emails, index_key(&user.email), "email"),
            ] {
                match index.entry(key) {
                    Entry::Occupied(slot) => {
                        return Err(SnapshotError::Duplicate {
                            field,
                            value: slot.key().clone(),
                        })
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(user.id);
                    }
                }
            }
            store.inner.users.insert(user.id, user);
        }
        for post in snapshot.posts {
            store.inner.posts.insert(post.id, post);
        }
        for notification in snapshot.notifications {
            store.inner.notifications.insert(notification.id, notification);
        }

        Ok(store)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.users.get(&id).map(|e| e.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let id = match self.inner.usernames.get(&index_key(username)) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.get_user(id).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let username_key = index_key(&new_user.username);
        let email_key = index_key(&new_user.email);
        if username_key.is_empty() || email_key.is_empty() {
            return Err(DomainError::Validation(
                "username and email are required".to_string(),
            ));
        }

        let id = Uuid::now_v7();

        // 1. Reserve the username
        match self.inner.usernames.entry(username_key.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::Conflict("username is already taken".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        // 2. Reserve the email, releasing the username on conflict
        match self.inner.emails.entry(email_key) {
            Entry::Occupied(_) => {
                self.inner.usernames.remove(&username_key);
                return Err(DomainError::Conflict("email is already taken".to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        // 3. Insert the document
        let user = User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            profile: new_user.profile,
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
            liked_posts: BTreeSet::new(),
            created_at: Utc::now(),
        };
        self.inner.users.insert(id, user.clone());
        debug!(user = %id, "user created");
        Ok(user)
    }

    async fn add_to_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize> {
        let mut user = self
            .inner
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        let set = user_set_mut(&mut user, field);
        set.insert(value);
        Ok(set.len())
    }

    async fn remove_from_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize> {
        let mut user = self
            .inner
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        let set = user_set_mut(&mut user, field);
        set.remove(&value);
        Ok(set.len())
    }

    async fn sample_users(&self, exclude: Uuid, n: usize) -> Result<Vec<User>> {
        let mut ids: Vec<Uuid> = self
            .inner
            .users
            .iter()
            .map(|e| *e.key())
            .filter(|id| *id != exclude)
            .collect();
        ids.shuffle(&mut rand::rng());
        ids.truncate(n);

        Ok(ids
            .into_iter()
            .filter_map(|id| self.inner.users.get(&id).map(|e| e.value().clone()))
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.inner.users.iter().map(|e| e.value().clone()).collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.inner.posts.get(&id).map(|e| e.value().clone()))
    }

    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let post = Post {
            id: Uuid::now_v7(),
            author_id: new_post.author_id,
            text: new_post.text,
            media: new_post.media,
            likes: BTreeSet::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        };
        self.inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.inner.posts.remove(&id).is_some())
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize> {
        let mut post = self
            .inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        post.likes.insert(user_id);
        Ok(post.likes.len())
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<usize> {
        let mut post = self
            .inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        post.likes.remove(&user_id);
        Ok(post.likes.len())
    }

    async fn append_comment(&self, post_id: Uuid, comment: Comment) -> Result<Post> {
        let mut post = self
            .inner
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        post.comments.push(comment);
        Ok(post.clone())
    }

    async fn get_posts(&self, ids: Vec<Uuid>) -> Result<Vec<Post>> {
        Ok(ids
            .into_iter()
            .filter_map(|id| self.inner.posts.get(&id).map(|e| e.value().clone()))
            .collect())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self.inner.posts.iter().map(|e| e.value().clone()).collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(posts)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::now_v7(),
            from: new.from,
            to: new.to,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.inner
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for(&self, to: Uuid) -> Result<Vec<Notification>> {
        let mut found: Vec<Notification> = self
            .inner
            .notifications
            .iter()
            .filter(|e| e.value().to == to)
            .map(|e| e.value().clone())
            .collect();
        newest_first(&mut found, |n| (n.created_at, n.id));
        Ok(found)
    }

    async fn mark_read(&self, to: Uuid, ids: Vec<Uuid>) -> Result<usize> {
        let mut changed = 0;
        for id in ids {
            if let Some(mut entry) = self.inner.notifications.get_mut(&id) {
                if entry.to == to && !entry.read {
                    entry.read = true;
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn delete_all_for(&self, to: Uuid) -> Result<usize> {
        let ids: Vec<Uuid> = self
            .inner
            .notifications
            .iter()
            .filter(|e| e.value().to == to)
            .map(|e| *e.key())
            .collect();

        Ok(ids
            .iter()
            .filter(|id| self.inner.notifications.remove(id).is_some())
            .count())
    }
}
