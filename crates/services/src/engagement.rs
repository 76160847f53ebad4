//! # Engagement Ledger
//!
//! Toggles a like edge between a user and a post. The edge lives in
//! `post.likes` and its mirror `user.liked_posts`; the decision is taken from
//! `post.likes`, which is also written first.
//!
//! Liking one's own post is allowed and never notifies.

use std::sync::Arc;

use domains::{
    DomainError, LikeOutcome, LikeState, NewNotification, NotificationKind,
    NotificationRepository, PostRepository, Result, UserRepository, UserSet,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::steps::StepLog;

pub struct EngagementLedger {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl EngagementLedger {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            users,
            posts,
            notifications,
        }
    }

    /// Likes the post if the actor has not liked it yet, unlikes otherwise.
    /// `like_count` is the post's like cardinality right after the post-side write.
    #[instrument(skip(self), fields(actor = %actor_id, post = %post_id))]
    pub async fn toggle_like(&self, actor_id: Uuid, post_id: Uuid) -> Result<LikeOutcome> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        // The actor must exist before the post side is written.
        if self.users.get_user(actor_id).await?.is_none() {
            return Err(DomainError::user_not_found(actor_id));
        }

        let mut steps = StepLog::new("toggle_like");

        if post.likes.contains(&actor_id) {
            let like_count = steps
                .run("post.likes", self.posts.remove_like(post_id, actor_id))
                .await?;
            steps
                .run(
                    "user.likedPosts",
                    self.users
                        .remove_from_set(actor_id, UserSet::LikedPosts, post_id),
                )
                .await?;

            info!(like_count, "post unliked");
            return Ok(LikeOutcome {
                state: LikeState::Unliked,
                like_count,
            });
        }

        let like_count = steps
            .run("post.likes", self.posts.add_like(post_id, actor_id))
            .await?;
        steps
            .run(
                "user.likedPosts",
                self.users.add_to_set(actor_id, UserSet::LikedPosts, post_id),
            )
            .await?;

        if actor_id != post.author_id {
            steps
                .run(
                    "notification",
                    self.notifications.create_notification(NewNotification {
                        from: actor_id,
                        to: post.author_id,
                        kind: NotificationKind::Like,
                    }),
                )
                .await?;
        }

        info!(like_count, "post liked");
        Ok(LikeOutcome {
            state: LikeState::Liked,
            like_count,
        })
    }
}
