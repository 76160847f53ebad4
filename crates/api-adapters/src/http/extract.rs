//! Request extractors.
//!
//! Session handling lives in front of this service; by the time a request
//! arrives, the authenticated user id is carried in [`ACTOR_HEADER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use domains::DomainError;
use uuid::Uuid;

use super::ApiError;

pub const ACTOR_HEADER: &str = "x-user-id";

/// The authenticated user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthenticated)?;
        Ok(Actor(parse_id(raw)?))
    }
}

/// Parses a path or header id, reporting garbage as a validation failure
/// rather than a routing miss.
pub fn parse_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::Validation(format!("'{raw}' is not a valid id")))
}
