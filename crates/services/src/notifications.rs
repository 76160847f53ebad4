//! # Notification Fan-out (read side)
//!
//! Notifications are written by the follow graph and the engagement ledger.
//! This service lists them for their recipient and deletes them in bulk.

use std::sync::Arc;

use domains::{Notification, NotificationRepository, Result};
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct NotificationFanout {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationFanout {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Returns the recipient's notifications newest-first, then marks exactly
    /// those read.
    ///
    /// The returned items reflect the state *before* marking, so a notification
    /// only shows `read = true` from the next call on. One created after the
    /// read stays unread until it is listed.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self.notifications.list_for(user_id).await?;
        let unread: Vec<Uuid> = notifications
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.id)
            .collect();
        let marked = if unread.is_empty() {
            0
        } else {
            self.notifications.mark_read(user_id, unread).await?
        };

        debug!(count = notifications.len(), marked, "notifications listed");
        Ok(notifications)
    }

    /// Deletes every notification addressed to the user. Idempotent.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn delete_all(&self, user_id: Uuid) -> Result<usize> {
        let removed = self.notifications.delete_all_for(user_id).await?;
        info!(removed, "notifications deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::notification_for;
    use domains::{DomainError, MockNotificationRepository, NewNotification, NotificationKind};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::Mutex;

    #[tokio::test]
    async fn list_reads_before_marking() {
        let user_id = Uuid::now_v7();
        let unread = notification_for(NewNotification {
            from: Uuid::now_v7(),
            to: user_id,
            kind: NotificationKind::Follow,
        });
        let expected = unread.clone();
        let unread_id = unread.id;
        let mut repo = MockNotificationRepository::new();
        let mut seq = Sequence::new();

        repo.expect_list_for()
            .with(eq(user_id))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(vec![unread.clone()]));
        repo.expect_mark_read()
            .with(eq(user_id), eq(vec![unread_id]))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(1));

        let fanout = NotificationFanout::new(Arc::new(repo));
        let listed = fanout.list(user_id).await.unwrap();

        assert_eq!(listed, vec![expected]);
        assert!(!listed[0].read);
    }

    #[tokio::test]
    async fn notification_arriving_after_the_read_stays_unread() {
        let user_id = Uuid::now_v7();
        let seen = notification_for(NewNotification {
            from: Uuid::now_v7(),
            to: user_id,
            kind: NotificationKind::Follow,
        });
        let late = notification_for(NewNotification {
            from: Uuid::now_v7(),
            to: user_id,
            kind: NotificationKind::Like,
        });
        let inbox = Arc::new(Mutex::new(vec![seen.clone()]));

        let mut repo = MockNotificationRepository::new();
        let listing = Arc::clone(&inbox);
        repo.expect_list_for().times(1).returning(move |_| {
            let snapshot = listing.lock().unwrap().clone();
            // A like lands right after the read.
            listing.lock().unwrap().push(late.clone());
            Ok(snapshot)
        });
        let marking = Arc::clone(&inbox);
        repo.expect_mark_read().times(1).returning(move |_, ids| {
            let mut changed = 0;
            for n in marking.lock().unwrap().iter_mut() {
                if ids.contains(&n.id) && !n.read {
                    n.read = true;
                    changed += 1;
                }
            }
            Ok(changed)
        });

        let fanout = NotificationFanout::new(Arc::new(repo));
        let listed = fanout.list(user_id).await.unwrap();

        assert_eq!(listed.len(), 1);
        let inbox = inbox.lock().unwrap();
        let unseen: Vec<_> = inbox.iter().filter(|n| n.id != seen.id).collect();
        assert_eq!(unseen.len(), 1);
        assert!(!unseen[0].read);
        assert!(inbox.iter().any(|n| n.id == seen.id && n.read));
    }

    #[tokio::test]
    async fn already_read_inbox_skips_the_mark() {
        let user_id = Uuid::now_v7();
        let mut read = notification_for(NewNotification {
            from: Uuid::now_v7(),
            to: user_id,
            kind: NotificationKind::Follow,
        });
        read.read = true;
        let mut repo = MockNotificationRepository::new();
        repo.expect_list_for().returning(move |_| Ok(vec![read.clone()]));
        repo.expect_mark_read().never();

        let fanout = NotificationFanout::new(Arc::new(repo));
        assert_eq!(fanout.list(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_failure_is_surfaced_not_swallowed() {
        let user_id = Uuid::now_v7();
        let unread = notification_for(NewNotification {
            from: Uuid::now_v7(),
            to: user_id,
            kind: NotificationKind::Follow,
        });
        let mut repo = MockNotificationRepository::new();
        repo.expect_list_for().returning(move |_| Ok(vec![unread.clone()]));
        repo.expect_mark_read()
            .returning(|_, _| Err(DomainError::TransientStore("write refused".into())));

        let fanout = NotificationFanout::new(Arc::new(repo));
        let err = fanout.list(user_id).await.unwrap_err();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn delete_all_on_empty_inbox_succeeds() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_delete_all_for().returning(|_| Ok(0));

        let fanout = NotificationFanout::new(Arc::new(repo));
        assert_eq!(fanout.delete_all(Uuid::now_v7()).await.unwrap(), 0);
    }
}
