//! axum routing layer over [`services::SocialCore`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

use services::SocialCore;

use crate::Metrics;

pub use error::ApiError;
pub use extract::{Actor, ACTOR_HEADER};
pub use routes::{router, RouterOptions};

/// State shared by every handler.
pub struct AppState {
    pub core: SocialCore,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(core: SocialCore) -> Self {
        Self {
            core,
            metrics: Metrics::new(),
        }
    }
}
