//! # Comment Journal
//!
//! Appends immutable comments to a post. Comments do not notify the post
//! author; only follow and like edges fan out.

use std::sync::Arc;

use chrono::Utc;
use domains::{Comment, DomainError, Post, PostRepository, Result};
use tracing::{info, instrument};
use uuid::Uuid;

pub struct CommentJournal {
    posts: Arc<dyn PostRepository>,
}

impl CommentJournal {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Appends a comment and returns the post as stored after the append.
    #[instrument(skip(self, text), fields(actor = %actor_id, post = %post_id))]
    pub async fn add_comment(&self, actor_id: Uuid, post_id: Uuid, text: &str) -> Result<Post> {
        if text.trim().is_empty() {
            return Err(DomainError::Validation("comment text is required".to_string()));
        }

        let comment = Comment {
            id: Uuid::now_v7(),
            author_id: actor_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let comment_id = comment.id;

        // The append is a single atomic write; the store reports a missing post.
        let post = self.posts.append_comment(post_id, comment).await?;

        info!(comment = %comment_id, total = post.comments.len(), "comment appended");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::post_by;
    use domains::MockPostRepository;
    use mockall::predicate::{always, eq};

    #[test]
    fn blank_text_is_rejected_without_io() {
        let mut posts = MockPostRepository::new();
        posts.expect_append_comment().never();
        let journal = CommentJournal::new(Arc::new(posts));

        let err = tokio_test::block_on(journal.add_comment(Uuid::now_v7(), Uuid::now_v7(), "  \n\t"))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn appended_comment_carries_actor_and_text() {
        let actor_id = Uuid::now_v7();
        let post = post_by(Uuid::now_v7());
        let post_id = post.id;
        let mut posts = MockPostRepository::new();
        posts
            .expect_append_comment()
            .with(eq(post_id), always())
            .times(1)
            .returning(move |_, comment| {
                let mut updated = post.clone();
                updated.comments.push(comment);
                Ok(updated)
            });

        let journal = CommentJournal::new(Arc::new(posts));
        let updated = journal.add_comment(actor_id, post_id, "nice shot").await.unwrap();

        assert_eq!(updated.comments.len(), 1);
        assert_eq!(updated.comments[0].author_id, actor_id);
        assert_eq!(updated.comments[0].text, "nice shot");
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let post_id = Uuid::now_v7();
        let mut posts = MockPostRepository::new();
        posts
            .expect_append_comment()
            .returning(move |id, _| Err(DomainError::post_not_found(id)));

        let journal = CommentJournal::new(Arc::new(posts));
        let err = journal
            .add_comment(Uuid::now_v7(), post_id, "hello")
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::post_not_found(post_id));
    }
}
