//! Shared fixtures for the end-to-end suites.
//!
//! [`Harness`] wires the real in-memory store to a [`SocialCore`]. Users are
//! seeded with `fake` names; a counter suffix keeps them unique under the
//! store's case-insensitive index. [`FlakyUsers`] wraps the store to fail one
//! chosen user-side write, which is how the partial-failure scenarios are
//! driven against real state.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domains::{
    DomainError, NewUser, Post, PostRepository, Profile, Result, User, UserRepository, UserSet,
};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use services::{CoreOptions, SocialCore};
use storage_adapters::MemoryStore;
use uuid::Uuid;

static SEQ: AtomicUsize = AtomicUsize::new(0);

pub struct Harness {
    pub store: MemoryStore,
    pub core: SocialCore,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(CoreOptions::default())
    }

    pub fn with_options(options: CoreOptions) -> Self {
        let store = MemoryStore::new();
        let shared = Arc::new(store.clone());
        let core = SocialCore::new(shared.clone(), shared.clone(), shared, options);
        Self { store, core }
    }

    /// Routes user writes through `users` while posts and notifications hit
    /// the plain store.
    pub fn over(users: Arc<dyn UserRepository>, store: MemoryStore) -> Self {
        let shared = Arc::new(store.clone());
        let core = SocialCore::new(users, shared.clone(), shared, CoreOptions::default());
        Self { store, core }
    }

    pub async fn user(&self) -> anyhow::Result<User> {
        let n = SEQ.fetch_add(1, Ordering::Relaxed);
        let username: String = Username().fake();
        let email: String = SafeEmail().fake();
        Ok(self
            .store
            .create_user(NewUser {
                username: format!("{username}{n}"),
                email: format!("{n}.{email}"),
                password_hash: "$argon2id$fixture".to_string(),
                profile: Profile::default(),
            })
            .await?)
    }

    pub async fn users(&self, count: usize) -> anyhow::Result<Vec<User>> {
        let mut users = Vec::with_capacity(count);
        for _ in 0..count {
            users.push(self.user().await?);
        }
        Ok(users)
    }

    pub async fn post_by(&self, author: Uuid) -> anyhow::Result<Post> {
        Ok(self
            .core
            .posts
            .create_post(author, Some("chirp chirp".to_string()), None)
            .await?)
    }

    pub async fn reload_user(&self, id: Uuid) -> anyhow::Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {id} vanished"))
    }

    pub async fn reload_post(&self, id: Uuid) -> anyhow::Result<Post> {
        self.store
            .get_post(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("post {id} vanished"))
    }
}

/// User store that fails the next `add_to_set` / `remove_from_set` on an
/// armed field with a transient error, then behaves normally.
pub struct FlakyUsers {
    inner: MemoryStore,
    armed: Mutex<Option<UserSet>>,
}

impl FlakyUsers {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            armed: Mutex::new(None),
        }
    }

    pub fn fail_next(&self, field: UserSet) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = Some(field);
        }
    }

    fn trip(&self, field: UserSet) -> Result<()> {
        let mut armed = self
            .armed
            .lock()
            .map_err(|_| DomainError::TransientStore("fault injector poisoned".into()))?;
        if *armed == Some(field) {
            *armed = None;
            return Err(DomainError::TransientStore(format!(
                "injected failure writing {}",
                field.field_name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FlakyUsers {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.inner.find_by_username(username).await
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.inner.create_user(new_user).await
    }

    async fn add_to_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize> {
        self.trip(field)?;
        self.inner.add_to_set(id, field, value).await
    }

    async fn remove_from_set(&self, id: Uuid, field: UserSet, value: Uuid) -> Result<usize> {
        self.trip(field)?;
        self.inner.remove_from_set(id, field, value).await
    }

    async fn sample_users(&self, exclude: Uuid, n: usize) -> Result<Vec<User>> {
        self.inner.sample_users(exclude, n).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.inner.list_users().await
    }
}
