//! # Consistency Auditor
//!
//! Read-only sweep over users and posts that reports every edge whose two
//! sides disagree, plus an explicit, operator-invoked repair.
//!
//! Repair treats the side a toggle decides from as authoritative:
//! `actor.following` for follows and `post.likes` for likes. That is the
//! state a retried toggle would act on, so repair and retry agree. Each
//! asymmetry is re-read from that side before it is fixed; anything that
//! changed since the sweep is left alone.

use std::sync::Arc;

use domains::invariants::{self, RefField, Violation};
use domains::{DomainError, PostRepository, Result, UserRepository, UserSet};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub users_scanned: usize,
    pub posts_scanned: usize,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    /// Violations fixed by a write
    pub repaired: usize,
    /// Violations that no longer held when re-read
    pub stale: usize,
}

pub struct ConsistencyAuditor {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl ConsistencyAuditor {
    pub fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    #[instrument(skip(self))]
    pub async fn audit(&self) -> Result<AuditReport> {
        let users = self.users.list_users().await?;
        let posts = self.posts.list_posts().await?;
        let violations = invariants::check_all(&users, &posts);

        if violations.is_empty() {
            info!(users = users.len(), posts = posts.len(), "audit clean");
        } else {
            warn!(users = users.len(), posts = posts.len(), violations = violations.len(), "audit found violations");
        }

        Ok(AuditReport {
            users_scanned: users.len(),
            posts_scanned: posts.len(),
            violations,
        })
    }

    #[instrument(skip(self, report), fields(violations = report.violations.len()))]
    pub async fn repair(&self, report: &AuditReport) -> Result<RepairSummary> {
        let mut summary = RepairSummary::default();
        for violation in &report.violations {
            if self.repair_one(violation).await? {
                summary.repaired += 1;
            } else {
                summary.stale += 1;
            }
        }
        info!(repaired = summary.repaired, stale = summary.stale, "repair finished");
        Ok(summary)
    }

    async fn repair_one(&self, violation: &Violation) -> Result<bool> {
        match *violation {
            Violation::FollowMissingFollower { follower, followee } => {
                if !self.user_follows(follower, followee).await? {
                    return Ok(false);
                }
                self.users
                    .add_to_set(followee, UserSet::Followers, follower)
                    .await?;
            }
            Violation::FollowMissingFollowing { follower, followee } => {
                if self.user_follows(follower, followee).await? {
                    return Ok(false);
                }
                self.users
                    .remove_from_set(followee, UserSet::Followers, follower)
                    .await?;
            }
            Violation::SelfFollow { user } => {
                self.users
                    .remove_from_set(user, UserSet::Following, user)
                    .await?;
                self.users
                    .remove_from_set(user, UserSet::Followers, user)
                    .await?;
            }
            Violation::LikeMissingOnUser { user, post } => {
                if !self.post_liked_by(post, user).await? {
                    return Ok(false);
                }
                self.users
                    .add_to_set(user, UserSet::LikedPosts, post)
                    .await?;
            }
            Violation::LikeMissingOnPost { user, post } => {
                if self.post_liked_by(post, user).await? {
                    return Ok(false);
                }
                self.users
                    .remove_from_set(user, UserSet::LikedPosts, post)
                    .await?;
            }
            Violation::DanglingUser {
                holder,
                field,
                missing,
            } => {
                if self.users.get_user(missing).await?.is_some() {
                    return Ok(false);
                }
                let write = match field {
                    RefField::Following => {
                        self.users
                            .remove_from_set(holder, UserSet::Following, missing)
                            .await
                    }
                    RefField::Followers => {
                        self.users
                            .remove_from_set(holder, UserSet::Followers, missing)
                            .await
                    }
                    RefField::Likes => self.posts.remove_like(holder, missing).await,
                };
                return ignore_missing_holder(write);
            }
            Violation::DanglingPost { user, missing } => {
                if self.posts.get_post(missing).await?.is_some() {
                    return Ok(false);
                }
                let write = self
                    .users
                    .remove_from_set(user, UserSet::LikedPosts, missing)
                    .await;
                return ignore_missing_holder(write);
            }
        }
        Ok(true)
    }

    async fn user_follows(&self, follower: Uuid, followee: Uuid) -> Result<bool> {
        Ok(self
            .users
            .get_user(follower)
            .await?
            .is_some_and(|u| u.is_following(followee)))
    }

    async fn post_liked_by(&self, post: Uuid, user: Uuid) -> Result<bool> {
        Ok(self
            .posts
            .get_post(post)
            .await?
            .is_some_and(|p| p.likes.contains(&user)))
    }
}

// The holder itself vanished since the sweep: nothing left to clean.
fn ignore_missing_holder(write: Result<usize>) -> Result<bool> {
    match write {
        Ok(_) => Ok(true),
        Err(DomainError::NotFound(_, _)) => Ok(false),
        Err(err) => Err(err),
    }
}
