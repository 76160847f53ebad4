use domains::{DomainError, LikeState, NotificationKind, NotificationRepository};
use integration_tests::Harness;

#[tokio::test]
async fn like_sequence_keeps_both_sides_in_step() -> anyhow::Result<()> {
    let h = Harness::new();
    let author = h.user().await?;
    let fan = h.user().await?;
    let post = h.post_by(author.id).await?;

    for round in 0..5 {
        let outcome = h.core.likes.toggle_like(fan.id, post.id).await?;
        let post_now = h.reload_post(post.id).await?;
        let fan_now = h.reload_user(fan.id).await?;

        assert_eq!(outcome.like_count, post_now.likes.len());
        assert_eq!(
            post_now.likes.contains(&fan.id),
            fan_now.liked_posts.contains(&post.id)
        );
        let expected = if round % 2 == 0 { LikeState::Liked } else { LikeState::Unliked };
        assert_eq!(outcome.state, expected);
    }

    // One notification per like, none per unlike.
    let inbox = h.store.list_for(author.id).await?;
    assert_eq!(inbox.len(), 3);
    assert!(inbox.iter().all(|n| n.kind == NotificationKind::Like && n.from == fan.id));
    Ok(())
}

#[tokio::test]
async fn self_like_counts_but_does_not_notify() -> anyhow::Result<()> {
    let h = Harness::new();
    let author = h.user().await?;
    let post = h.post_by(author.id).await?;

    let outcome = h.core.likes.toggle_like(author.id, post.id).await?;
    assert_eq!(outcome.state, LikeState::Liked);
    assert_eq!(outcome.like_count, 1);
    assert!(h.reload_post(post.id).await?.likes.contains(&author.id));
    assert!(h.store.list_for(author.id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn like_count_tracks_many_likers() -> anyhow::Result<()> {
    let h = Harness::new();
    let author = h.user().await?;
    let post = h.post_by(author.id).await?;
    let fans = h.users(4).await?;

    let mut last = 0;
    for fan in &fans {
        last = h.core.likes.toggle_like(fan.id, post.id).await?.like_count;
    }
    assert_eq!(last, 4);

    let outcome = h.core.likes.toggle_like(fans[0].id, post.id).await?;
    assert_eq!(outcome.state, LikeState::Unliked);
    assert_eq!(outcome.like_count, 3);

    let liked = h.core.posts.liked_posts(fans[1].id).await?;
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].id, post.id);
    Ok(())
}

#[tokio::test]
async fn liking_a_missing_post_is_not_found() -> anyhow::Result<()> {
    let h = Harness::new();
    let fan = h.user().await?;

    let err = h
        .core
        .likes
        .toggle_like(fan.id, uuid::Uuid::now_v7())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_, _)));
    assert!(h.reload_user(fan.id).await?.liked_posts.is_empty());
    Ok(())
}
