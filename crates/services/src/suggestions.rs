//! # Suggestion Sampler
//!
//! Picks a few users the caller does not follow yet from a uniform random
//! pool. The pool is filtered, never topped up, so short results are normal.

use std::sync::Arc;

use domains::{DomainError, PublicUser, Result, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionPolicy {
    /// How many random candidates are drawn before filtering
    pub pool_size: usize,
    /// Result size when the caller does not ask for one
    pub default_count: usize,
    /// Upper bound on a caller-supplied count
    pub max_count: usize,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            pool_size: 10,
            default_count: 4,
            max_count: 10,
        }
    }
}

pub struct SuggestionSampler {
    users: Arc<dyn UserRepository>,
    policy: SuggestionPolicy,
}

impl SuggestionSampler {
    pub fn new(users: Arc<dyn UserRepository>, policy: SuggestionPolicy) -> Self {
        Self { users, policy }
    }

    pub fn policy(&self) -> SuggestionPolicy {
        self.policy
    }

    /// At most `count` (default from the policy) users, excluding the caller
    /// and everyone the caller follows.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn suggest(&self, user_id: Uuid, count: Option<usize>) -> Result<Vec<PublicUser>> {
        let count = count
            .unwrap_or(self.policy.default_count)
            .min(self.policy.max_count);

        let me = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        let pool = self.users.sample_users(user_id, self.policy.pool_size).await?;
        let drawn = pool.len();

        let suggestions: Vec<PublicUser> = pool
            .into_iter()
            .filter(|candidate| candidate.id != user_id && !me.is_following(candidate.id))
            .take(count)
            .map(PublicUser::from)
            .collect();

        debug!(drawn, returned = suggestions.len(), "suggestions sampled");
        Ok(suggestions)
    }
}
