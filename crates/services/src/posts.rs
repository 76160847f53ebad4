//! # Post Catalog
//!
//! Creation, deletion and the read-side listings over posts.
//!
//! Deleting a post cascades into every liker's `liked_posts` before the post
//! document itself is removed. If a cascade write fails the post is left in
//! place, so retrying the delete finishes the job.

use std::sync::Arc;

use domains::{
    DomainError, NewPost, Post, PostRepository, Result, UserRepository, UserSet,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct PostCatalog {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    cascade_unlike_on_delete: bool,
}

impl PostCatalog {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        cascade_unlike_on_delete: bool,
    ) -> Self {
        Self {
            users,
            posts,
            cascade_unlike_on_delete,
        }
    }

    /// A post needs text or media. Blank text counts as absent.
    #[instrument(skip(self, text, media), fields(actor = %actor_id))]
    pub async fn create_post(
        &self,
        actor_id: Uuid,
        text: Option<String>,
        media: Option<String>,
    ) -> Result<Post> {
        let text = text.filter(|t| !t.trim().is_empty());
        let media = media.filter(|m| !m.trim().is_empty());
        if text.is_none() && media.is_none() {
            return Err(DomainError::Validation(
                "post must have text or image".to_string(),
            ));
        }

        if self.users.get_user(actor_id).await?.is_none() {
            return Err(DomainError::user_not_found(actor_id));
        }

        let post = self
            .posts
            .create_post(NewPost {
                author_id: actor_id,
                text,
                media,
            })
            .await?;

        info!(post = %post.id, "post created");
        Ok(post)
    }

    #[instrument(skip(self), fields(actor = %actor_id, post = %post_id))]
    pub async fn delete_post(&self, actor_id: Uuid, post_id: Uuid) -> Result<()> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;

        if post.author_id != actor_id {
            return Err(DomainError::Forbidden(
                "you are not authorized to delete this post".to_string(),
            ));
        }

        if self.cascade_unlike_on_delete {
            for liker_id in &post.likes {
                match self
                    .users
                    .remove_from_set(*liker_id, UserSet::LikedPosts, post_id)
                    .await
                {
                    Ok(_) => {}
                    // Already gone; nothing to clean on that side.
                    Err(DomainError::NotFound(_, _)) => {
                        debug!(liker = %liker_id, "liker missing during cascade");
                    }
                    Err(err) => {
                        warn!(liker = %liker_id, error = %err, "cascade aborted; post kept for retry");
                        return Err(err);
                    }
                }
            }
        }

        self.posts.delete_post(post_id).await?;
        info!(likers = post.likes.len(), "post deleted");
        Ok(())
    }

    /// Every post, newest first.
    pub async fn all_posts(&self) -> Result<Vec<Post>> {
        self.posts.list_posts().await
    }

    /// Posts the user has liked, newest first. Ids pointing at deleted posts are skipped.
    #[instrument(skip(self), fields(user = %user_id))]
    pub async fn liked_posts(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_id))?;

        let mut posts = self
            .posts
            .get_posts(user.liked_posts.into_iter().collect())
            .await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}
