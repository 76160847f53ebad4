//! # Profile Directory
//!
//! Read-only lookups that return redacted users.

use std::collections::BTreeSet;
use std::sync::Arc;

use domains::{DomainError, PublicUser, Result, UserRepository};
use tracing::instrument;
use uuid::Uuid;

pub struct ProfileDirectory {
    users: Arc<dyn UserRepository>,
}

impl ProfileDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, username: &str) -> Result<PublicUser> {
        self.users
            .find_by_username(username)
            .await?
            .map(PublicUser::from)
            .ok_or_else(|| DomainError::NotFound("User".to_string(), username.to_string()))
    }

    /// Users `user_id` follows.
    pub async fn following(&self, user_id: Uuid) -> Result<Vec<PublicUser>> {
        let user = self.require(user_id).await?;
        self.resolve(user.following).await
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<PublicUser>> {
        let user = self.require(user_id).await?;
        self.resolve(user.followers).await
    }

    async fn require(&self, user_id: Uuid) -> Result<domains::User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))
    }

    // Ids without a document are skipped; the audit reports them.
    async fn resolve(&self, ids: BTreeSet<Uuid>) -> Result<Vec<PublicUser>> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.users.get_user(id).await? {
                resolved.push(PublicUser::from(user));
            }
        }
        Ok(resolved)
    }
}
