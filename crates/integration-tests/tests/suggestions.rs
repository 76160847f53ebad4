use std::collections::HashSet;

use integration_tests::Harness;

#[tokio::test]
async fn suggestions_exclude_self_and_followed() -> anyhow::Result<()> {
    let h = Harness::new();
    let me = h.user().await?;
    let others = h.users(8).await?;
    for followed in &others[..3] {
        h.core.follows.toggle_follow(me.id, followed.id).await?;
    }
    let me_now = h.reload_user(me.id).await?;

    // Sampling is random; repeat to cover many draws.
    for _ in 0..25 {
        let picks = h.core.suggestions.suggest(me.id, Some(4)).await?;
        assert!(picks.len() <= 4);
        let ids: HashSet<_> = picks.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), picks.len());
        assert!(!ids.contains(&me.id));
        assert!(ids.is_disjoint(&me_now.following.iter().copied().collect()));
    }
    Ok(())
}

#[tokio::test]
async fn suggestions_are_empty_when_everyone_is_followed() -> anyhow::Result<()> {
    let h = Harness::new();
    let me = h.user().await?;
    for other in h.users(3).await? {
        h.core.follows.toggle_follow(me.id, other.id).await?;
    }

    assert!(h.core.suggestions.suggest(me.id, None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn requested_count_is_capped() -> anyhow::Result<()> {
    let h = Harness::new();
    let me = h.user().await?;
    h.users(12).await?;

    let picks = h.core.suggestions.suggest(me.id, Some(50)).await?;
    assert!(picks.len() <= h.core.suggestions.policy().max_count);
    Ok(())
}
