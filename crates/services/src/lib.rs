//! # services
//!
//! The social-engagement core. Every service holds its store ports behind
//! `Arc<dyn …>` so the binary can choose the adapter at startup and tests can
//! substitute mocks.

pub mod audit;
pub mod comments;
pub mod engagement;
pub mod follow_graph;
pub mod notifications;
pub mod posts;
pub mod profiles;
pub mod suggestions;

mod steps;

use std::sync::Arc;

use domains::{NotificationRepository, PostRepository, UserRepository};

pub use audit::{AuditReport, ConsistencyAuditor, RepairSummary};
pub use comments::CommentJournal;
pub use engagement::EngagementLedger;
pub use follow_graph::FollowGraph;
pub use notifications::NotificationFanout;
pub use posts::PostCatalog;
pub use profiles::ProfileDirectory;
pub use suggestions::{SuggestionPolicy, SuggestionSampler};

/// Knobs the binary passes down from its configuration.
#[derive(Debug, Clone, Copy)]
pub struct CoreOptions {
    pub suggestions: SuggestionPolicy,
    pub cascade_unlike_on_delete: bool,
}

impl Default for CoreOptions {
    fn default() -> Self {
        Self {
            suggestions: SuggestionPolicy::default(),
            cascade_unlike_on_delete: true,
        }
    }
}

/// Every service, wired to the same three stores.
pub struct SocialCore {
    pub follows: FollowGraph,
    pub likes: EngagementLedger,
    pub comments: CommentJournal,
    pub notifications: NotificationFanout,
    pub suggestions: SuggestionSampler,
    pub posts: PostCatalog,
    pub profiles: ProfileDirectory,
    pub audit: ConsistencyAuditor,
}

impl SocialCore {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        notifications: Arc<dyn NotificationRepository>,
        options: CoreOptions,
    ) -> Self {
        Self {
            follows: FollowGraph::new(users.clone(), notifications.clone()),
            likes: EngagementLedger::new(users.clone(), posts.clone(), notifications.clone()),
            comments: CommentJournal::new(posts.clone()),
            notifications: NotificationFanout::new(notifications),
            suggestions: SuggestionSampler::new(users.clone(), options.suggestions),
            posts: PostCatalog::new(users.clone(), posts.clone(), options.cascade_unlike_on_delete),
            profiles: ProfileDirectory::new(users.clone()),
            audit: ConsistencyAuditor::new(users, posts),
        }
    }
}
