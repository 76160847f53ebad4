//! # Invariant Checks
//!
//! Pure functions over snapshots of the user and post collections. They never
//! touch a store, so audit tooling and tests can run them over any read.
//!
//! Both sides of an edge are treated as co-equal here: a violation is reported
//! whenever the two derived sets disagree, regardless of which side is "ahead".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Post, User};

/// The set that holds a dangling user reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefField {
    /// `User::following`
    Following,
    /// `User::followers`
    Followers,
    /// `Post::likes`
    Likes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// `followee ∈ follower.following` but `follower ∉ followee.followers`
    FollowMissingFollower { follower: Uuid, followee: Uuid },
    /// `follower ∈ followee.followers` but `followee ∉ follower.following`
    FollowMissingFollowing { follower: Uuid, followee: Uuid },
    /// A user listed in its own `following` or `followers`
    SelfFollow { user: Uuid },
    /// `post ∈ user.liked_posts` but `user ∉ post.likes`
    LikeMissingOnPost { user: Uuid, post: Uuid },
    /// `user ∈ post.likes` but `post ∉ user.liked_posts`
    LikeMissingOnUser { user: Uuid, post: Uuid },
    /// A set references a user id that no longer exists
    DanglingUser {
        holder: Uuid,
        field: RefField,
        missing: Uuid,
    },
    /// `user.liked_posts` references a post that no longer exists
    DanglingPost { user: Uuid, missing: Uuid },
}

/// I1 and I3 over the user collection.
pub fn check_follow_symmetry(users: &[User]) -> Vec<Violation> {
    let index: BTreeMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();
    let mut violations = Vec::new();

    for user in index.values() {
        if user.following.contains(&user.id) || user.followers.contains(&user.id) {
            violations.push(Violation::SelfFollow { user: user.id });
        }

        for followee_id in user.following.iter().filter(|id| **id != user.id) {
            match index.get(followee_id) {
                Some(followee) if !followee.followers.contains(&user.id) => {
                    violations.push(Violation::FollowMissingFollower {
                        follower: user.id,
                        followee: *followee_id,
                    });
                }
                Some(_) => {}
                None => violations.push(Violation::DanglingUser {
                    holder: user.id,
                    field: RefField::Following,
                    missing: *followee_id,
                }),
            }
        }

        for follower_id in user.followers.iter().filter(|id| **id != user.id) {
            match index.get(follower_id) {
                Some(follower) if !follower.following.contains(&user.id) => {
                    violations.push(Violation::FollowMissingFollowing {
                        follower: *follower_id,
                        followee: user.id,
                    });
                }
                Some(_) => {}
                None => violations.push(Violation::DanglingUser {
                    holder: user.id,
                    field: RefField::Followers,
                    missing: *follower_id,
                }),
            }
        }
    }

    violations
}

/// I2 over the user and post collections.
pub fn check_like_symmetry(users: &[User], posts: &[Post]) -> Vec<Violation> {
    let users_by_id: BTreeMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();
    let posts_by_id: BTreeMap<Uuid, &Post> = posts.iter().map(|p| (p.id, p)).collect();
    let mut violations = Vec::new();

    for user in users_by_id.values() {
        for post_id in &user.liked_posts {
            match posts_by_id.get(post_id) {
                Some(post) if !post.likes.contains(&user.id) => {
                    violations.push(Violation::LikeMissingOnPost {
                        user: user.id,
                        post: *post_id,
                    });
                }
                Some(_) => {}
                None => violations.push(Violation::DanglingPost {
                    user: user.id,
                    missing: *post_id,
                }),
            }
        }
    }

    for post in posts_by_id.values() {
        for liker_id in &post.likes {
            match users_by_id.get(liker_id) {
                Some(user) if !user.liked_posts.contains(&post.id) => {
                    violations.push(Violation::LikeMissingOnUser {
                        user: *liker_id,
                        post: post.id,
                    });
                }
                Some(_) => {}
                None => violations.push(Violation::DanglingUser {
                    holder: post.id,
                    field: RefField::Likes,
                    missing: *liker_id,
                }),
            }
        }
    }

    violations
}

/// Every check, follow violations first.
pub fn check_all(users: &[User], posts: &[Post]) -> Vec<Violation> {
    let mut violations = check_follow_symmetry(users);
    violations.extend(check_like_symmetry(users, posts));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn user(id: Uuid) -> User {
        User {
            id,
            username: format!("u{}", id.simple()),
            email: format!("{}@example.com", id.simple()),
            password_hash: String::new(),
            profile: Profile::default(),
            following: BTreeSet::new(),
            followers: BTreeSet::new(),
            liked_posts: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    fn post(id: Uuid, author_id: Uuid) -> Post {
        Post {
            id,
            author_id,
            text: Some("hello".into()),
            media: None,
            likes: BTreeSet::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn symmetric_follow_passes() {
        let (a_id, b_id) = (Uuid::now_v7(), Uuid::now_v7());
        let mut a = user(a_id);
        let mut b = user(b_id);
        a.following.insert(b_id);
        b.followers.insert(a_id);

        assert!(check_follow_symmetry(&[a, b]).is_empty());
    }

    #[test]
    fn half_applied_follow_is_reported_from_both_directions() {
        let (a_id, b_id, c_id) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let mut a = user(a_id);
        let mut b = user(b_id);
        let c = user(c_id);
        // a -> b written only on b's side, a -> c only on a's side
        b.followers.insert(a_id);
        a.following.insert(c_id);

        let violations = check_follow_symmetry(&[a, b, c]);
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&Violation::FollowMissingFollowing {
            follower: a_id,
            followee: b_id
        }));
        assert!(violations.contains(&Violation::FollowMissingFollower {
            follower: a_id,
            followee: c_id
        }));
    }

    #[test]
    fn self_edge_is_reported_once() {
        let a_id = Uuid::now_v7();
        let mut a = user(a_id);
        a.following.insert(a_id);
        a.followers.insert(a_id);

        assert_eq!(
            check_follow_symmetry(&[a]),
            vec![Violation::SelfFollow { user: a_id }]
        );
    }

    #[test]
    fn self_like_is_not_a_violation() {
        let (u_id, p_id) = (Uuid::now_v7(), Uuid::now_v7());
        let mut u = user(u_id);
        let mut p = post(p_id, u_id);
        u.liked_posts.insert(p_id);
        p.likes.insert(u_id);

        assert!(check_all(&[u], &[p]).is_empty());
    }

    #[test]
    fn deleted_post_leaves_dangling_reference() {
        let (u_id, p_id) = (Uuid::now_v7(), Uuid::now_v7());
        let mut u = user(u_id);
        u.liked_posts.insert(p_id);

        assert_eq!(
            check_like_symmetry(&[u], &[]),
            vec![Violation::DanglingPost {
                user: u_id,
                missing: p_id
            }]
        );
    }

    #[test]
    fn like_asymmetry_in_both_directions() {
        let (u_id, p1, p2) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let mut u = user(u_id);
        let mut post1 = post(p1, u_id);
        let post2 = post(p2, u_id);
        post1.likes.insert(u_id);
        u.liked_posts.insert(p2);

        let violations = check_like_symmetry(&[u], &[post1, post2]);
        assert!(violations.contains(&Violation::LikeMissingOnUser { user: u_id, post: p1 }));
        assert!(violations.contains(&Violation::LikeMissingOnPost { user: u_id, post: p2 }));
    }
}
