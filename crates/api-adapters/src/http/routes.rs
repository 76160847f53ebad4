use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;

use super::{handlers, middleware, AppState};

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterOptions {
    /// Mounts `/api/admin/audit` and `/api/admin/repair`
    pub admin_routes: bool,
}

/// Builds the full router. The binary nests nothing further; tests drive it
/// with `oneshot`.
pub fn router(state: Arc<AppState>, options: RouterOptions) -> Router {
    let users = Router::new()
        .route("/follow/{id}", post(handlers::toggle_follow))
        .route("/suggested", get(handlers::suggested))
        .route("/profile/{username}", get(handlers::profile))
        .route("/{id}/following", get(handlers::following))
        .route("/{id}/followers", get(handlers::followers));

    let posts = Router::new()
        .route("/create", post(handlers::create_post))
        .route("/all", get(handlers::all_posts))
        .route("/like/{id}", post(handlers::toggle_like))
        .route("/comment/{id}", post(handlers::add_comment))
        .route("/likes/{id}", get(handlers::liked_posts))
        .route("/{id}", delete(handlers::delete_post));

    let mut api = Router::new()
        .nest("/users", users)
        .nest("/posts", posts)
        .route(
            "/notifications",
            get(handlers::list_notifications).delete(handlers::delete_notifications),
        );

    if options.admin_routes {
        api = api.nest(
            "/admin",
            Router::new()
                .route("/audit", get(handlers::audit))
                .route("/repair", post(handlers::repair)),
        );
    }

    let (set_request_id, propagate_request_id) = middleware::request_id();

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id)
                .layer(middleware::trace())
                .layer(propagate_request_id)
                .layer(middleware::cors_policy()),
        )
        .with_state(state)
}
