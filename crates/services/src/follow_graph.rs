//! # Follow Graph
//!
//! Toggles a directed follow edge between two users, keeping
//! `actor.following` and `target.followers` in step.
//!
//! The store has no multi-document transaction, so the toggle is an ordered
//! list of single-document writes:
//!
//! 1. `target.followers` (add or remove actor)
//! 2. `actor.following` (add or remove target)
//! 3. follow notification, on edge creation only
//!
//! The decision is always taken from a fresh read of `actor.following`, which
//! is written last. A retry after a failure at step 2 therefore sees the edge
//! as still in its old state and re-issues both idempotent writes, converging
//! the two sides instead of flipping the edge twice.

use std::sync::Arc;

use domains::{
    DomainError, FollowState, NewNotification, NotificationKind, NotificationRepository, Result,
    UserRepository, UserSet,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::steps::StepLog;

pub struct FollowGraph {
    users: Arc<dyn UserRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl FollowGraph {
    pub fn new(
        users: Arc<dyn UserRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            users,
            notifications,
        }
    }

    /// Follows `target_id` if the actor does not follow it yet, unfollows otherwise.
    #[instrument(skip(self), fields(actor = %actor_id, target = %target_id))]
    pub async fn toggle_follow(&self, actor_id: Uuid, target_id: Uuid) -> Result<FollowState> {
        if actor_id == target_id {
            return Err(DomainError::SelfReference(
                "you can't follow/unfollow yourself".to_string(),
            ));
        }

        let actor = self
            .users
            .get_user(actor_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(actor_id))?;
        if self.users.get_user(target_id).await?.is_none() {
            return Err(DomainError::user_not_found(target_id));
        }

        if actor.is_following(target_id) {
            self.unfollow(actor_id, target_id).await?;
            info!("user unfollowed");
            Ok(FollowState::Unfollowed)
        } else {
            self.follow(actor_id, target_id).await?;
            info!("user followed");
            Ok(FollowState::Followed)
        }
    }

    async fn follow(&self, actor_id: Uuid, target_id: Uuid) -> Result<()> {
        let mut steps = StepLog::new("follow");

        steps
            .run(
                "target.followers",
                self.users.add_to_set(target_id, UserSet::Followers, actor_id),
            )
            .await?;
        steps
            .run(
                "actor.following",
                self.users.add_to_set(actor_id, UserSet::Following, target_id),
            )
            .await?;
        steps
            .run(
                "notification",
                self.notifications.create_notification(NewNotification {
                    from: actor_id,
                    to: target_id,
                    kind: NotificationKind::Follow,
                }),
            )
            .await?;

        Ok(())
    }

    async fn unfollow(&self, actor_id: Uuid, target_id: Uuid) -> Result<()> {
        let mut steps = StepLog::new("unfollow");

        steps
            .run(
                "target.followers",
                self.users
                    .remove_from_set(target_id, UserSet::Followers, actor_id),
            )
            .await?;
        steps
            .run(
                "actor.following",
                self.users
                    .remove_from_set(actor_id, UserSet::Following, target_id),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{notification_for, user};
    use domains::{MockNotificationRepository, MockUserRepository};
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn users_with(actor: domains::User, target: domains::User) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        let (actor_id, target_id) = (actor.id, target.id);
        users
            .expect_get_user()
            .with(eq(actor_id))
            .returning(move |_| Ok(Some(actor.clone())));
        users
            .expect_get_user()
            .with(eq(target_id))
            .returning(move |_| Ok(Some(target.clone())));
        users
    }

    #[tokio::test]
    async fn follow_writes_target_then_actor_then_notifies() {
        let (actor, target) = (user(), user());
        let (actor_id, target_id) = (actor.id, target.id);
        let mut users = users_with(actor, target);
        let mut notifications = MockNotificationRepository::new();
        let mut seq = Sequence::new();

        users
            .expect_add_to_set()
            .with(eq(target_id), eq(UserSet::Followers), eq(actor_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(1));
        users
            .expect_add_to_set()
            .with(eq(actor_id), eq(UserSet::Following), eq(target_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(1));
        notifications
            .expect_create_notification()
            .with(eq(NewNotification {
                from: actor_id,
                to: target_id,
                kind: NotificationKind::Follow,
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(notification_for(new)));

        let graph = FollowGraph::new(Arc::new(users), Arc::new(notifications));
        let state = graph.toggle_follow(actor_id, target_id).await.unwrap();

        assert_eq!(state, FollowState::Followed);
    }

    #[tokio::test]
    async fn unfollow_removes_both_sides_without_notifying() {
        let (mut actor, mut target) = (user(), user());
        actor.following.insert(target.id);
        target.followers.insert(actor.id);
        let (actor_id, target_id) = (actor.id, target.id);
        let mut users = users_with(actor, target);
        let mut notifications = MockNotificationRepository::new();
        let mut seq = Sequence::new();

        users
            .expect_remove_from_set()
            .with(eq(target_id), eq(UserSet::Followers), eq(actor_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(0));
        users
            .expect_remove_from_set()
            .with(eq(actor_id), eq(UserSet::Following), eq(target_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(0));
        notifications.expect_create_notification().never();

        let graph = FollowGraph::new(Arc::new(users), Arc::new(notifications));
        let state = graph.toggle_follow(actor_id, target_id).await.unwrap();

        assert_eq!(state, FollowState::Unfollowed);
    }

    #[tokio::test]
    async fn self_follow_is_rejected_before_any_io() {
        let id = Uuid::now_v7();
        let mut users = MockUserRepository::new();
        users.expect_get_user().never();
        users.expect_add_to_set().never();

        let graph = FollowGraph::new(
            Arc::new(users),
            Arc::new(MockNotificationRepository::new()),
        );
        let err = graph.toggle_follow(id, id).await.unwrap_err();

        assert!(matches!(err, DomainError::SelfReference(_)));
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let actor = user();
        let actor_id = actor.id;
        let target_id = Uuid::now_v7();
        let mut users = MockUserRepository::new();
        users
            .expect_get_user()
            .with(eq(actor_id))
            .returning(move |_| Ok(Some(actor.clone())));
        users
            .expect_get_user()
            .with(eq(target_id))
            .returning(|_| Ok(None));
        users.expect_add_to_set().never();

        let graph = FollowGraph::new(
            Arc::new(users),
            Arc::new(MockNotificationRepository::new()),
        );
        let err = graph.toggle_follow(actor_id, target_id).await.unwrap_err();

        assert_eq!(err, DomainError::user_not_found(target_id));
    }

    #[tokio::test]
    async fn failure_on_second_write_surfaces_and_skips_notification() {
        let (actor, target) = (user(), user());
        let (actor_id, target_id) = (actor.id, target.id);
        let mut users = users_with(actor, target);
        let mut notifications = MockNotificationRepository::new();

        users
            .expect_add_to_set()
            .with(eq(target_id), eq(UserSet::Followers), eq(actor_id))
            .times(1)
            .returning(|_, _, _| Ok(1));
        users
            .expect_add_to_set()
            .with(eq(actor_id), eq(UserSet::Following), eq(target_id))
            .times(1)
            .returning(|_, _, _| Err(DomainError::TransientStore("connection reset".into())));
        notifications.expect_create_notification().never();

        let graph = FollowGraph::new(Arc::new(users), Arc::new(notifications));
        let err = graph.toggle_follow(actor_id, target_id).await.unwrap_err();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn retry_after_partial_follow_converges_instead_of_unfollowing() {
        // target.followers already holds actor from an aborted attempt,
        // actor.following does not.
        let (actor, mut target) = (user(), user());
        target.followers.insert(actor.id);
        let (actor_id, target_id) = (actor.id, target.id);
        let mut users = users_with(actor, target);
        let mut notifications = MockNotificationRepository::new();

        users
            .expect_add_to_set()
            .with(eq(target_id), eq(UserSet::Followers), eq(actor_id))
            .times(1)
            .returning(|_, _, _| Ok(1));
        users
            .expect_add_to_set()
            .with(eq(actor_id), eq(UserSet::Following), eq(target_id))
            .times(1)
            .returning(|_, _, _| Ok(1));
        users.expect_remove_from_set().never();
        notifications
            .expect_create_notification()
            .times(1)
            .returning(|new| Ok(notification_for(new)));

        let graph = FollowGraph::new(Arc::new(users), Arc::new(notifications));
        let state = graph.toggle_follow(actor_id, target_id).await.unwrap();

        assert_eq!(state, FollowState::Followed);
    }
}
