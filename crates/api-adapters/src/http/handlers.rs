//! Route handlers. Each one parses ids, calls a single core operation and
//! records its outcome; all behaviour lives in `services`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use domains::{DomainError, FollowState, LikeOutcome, Notification, Post, PublicUser};
use serde::{Deserialize, Serialize};
use services::{AuditReport, RepairSummary};

use super::{extract::parse_id, Actor, ApiError, AppState};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn observed<T>(state: &AppState, operation: &str, result: Result<T, DomainError>) -> ApiResult<T> {
    state.metrics.observe(operation, &result);
    Ok(Json(result?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub state: FollowState,
}

pub async fn toggle_follow(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(target): Path<String>,
) -> ApiResult<FollowResponse> {
    let target = parse_id(&target)?;
    let result = state
        .core
        .follows
        .toggle_follow(actor, target)
        .await
        .map(|outcome| FollowResponse { state: outcome });
    observed(&state, "toggle_follow", result)
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestedQuery {
    pub count: Option<usize>,
}

pub async fn suggested(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Query(query): Query<SuggestedQuery>,
) -> ApiResult<Vec<PublicUser>> {
    let result = state.core.suggestions.suggest(actor, query.count).await;
    observed(&state, "suggest", result)
}

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<PublicUser> {
    let result = state.core.profiles.profile(&username).await;
    observed(&state, "profile", result)
}

pub async fn following(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Vec<PublicUser>> {
    let user = parse_id(&user)?;
    let result = state.core.profiles.following(user).await;
    observed(&state, "following", result)
}

pub async fn followers(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Vec<PublicUser>> {
    let user = parse_id(&user)?;
    let result = state.core.profiles.followers(user).await;
    observed(&state, "followers", result)
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePostBody {
    pub text: Option<String>,
    /// Media reference, already uploaded elsewhere
    pub img: Option<String>,
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Json(body): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let result = state.core.posts.create_post(actor, body.text, body.img).await;
    let Json(post) = observed(&state, "create_post", result)?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(post): Path<String>,
) -> Result<StatusCode, ApiError> {
    let post = parse_id(&post)?;
    let result = state.core.posts.delete_post(actor, post).await;
    state.metrics.observe("delete_post", &result);
    result?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(post): Path<String>,
) -> ApiResult<LikeOutcome> {
    let post = parse_id(&post)?;
    let result = state.core.likes.toggle_like(actor, post).await;
    observed(&state, "toggle_like", result)
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentBody {
    #[serde(default)]
    pub text: String,
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
    Path(post): Path<String>,
    Json(body): Json<CommentBody>,
) -> ApiResult<Post> {
    let post = parse_id(&post)?;
    let result = state.core.comments.add_comment(actor, post, &body.text).await;
    observed(&state, "add_comment", result)
}

pub async fn all_posts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Post>> {
    let result = state.core.posts.all_posts().await;
    observed(&state, "all_posts", result)
}

pub async fn liked_posts(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Vec<Post>> {
    let user = parse_id(&user)?;
    let result = state.core.posts.liked_posts(user).await;
    observed(&state, "liked_posts", result)
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
) -> ApiResult<Vec<Notification>> {
    let result = state.core.notifications.list(actor).await;
    observed(&state, "list_notifications", result)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

pub async fn delete_notifications(
    State(state): State<Arc<AppState>>,
    Actor(actor): Actor,
) -> ApiResult<DeletedResponse> {
    let result = state
        .core
        .notifications
        .delete_all(actor)
        .await
        .map(|deleted| DeletedResponse { deleted });
    observed(&state, "delete_notifications", result)
}

pub async fn audit(State(state): State<Arc<AppState>>) -> ApiResult<AuditReport> {
    let result = state.core.audit.audit().await;
    observed(&state, "audit", result)
}

#[derive(Debug, Serialize)]
pub struct RepairResponse {
    pub report: AuditReport,
    pub summary: RepairSummary,
}

/// Audits, then repairs whatever the fresh report found.
pub async fn repair(State(state): State<Arc<AppState>>) -> ApiResult<RepairResponse> {
    let result = async {
        let report = state.core.audit.audit().await?;
        let summary = state.core.audit.repair(&report).await?;
        Ok::<_, DomainError>(RepairResponse { report, summary })
    }
    .await;
    observed(&state, "repair", result)
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.render().map_err(|_| ApiError::Metrics)?;
    Ok((
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    ))
}

pub async fn health() -> &'static str {
    "ok"
}
