//! # DomainError
//!
//! Centralized error handling for the social core.
//! Maps store and validation failures to typed errors the routing layer can translate.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced entity is absent (e.g., User, Post)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// An actor tried to create an edge to itself (e.g., self-follow)
    #[error("self reference: {0}")]
    SelfReference(String),

    /// Validation failure (e.g., empty comment, malformed identifier)
    #[error("validation error: {0}")]
    Validation(String),

    /// Uniqueness violation surfaced by the store (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor does not own the resource it tries to mutate
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// I/O failure against the entity store. Never retried by the core.
    #[error("transient store error: {0}")]
    TransientStore(String),
}

impl DomainError {
    pub fn user_not_found(id: impl ToString) -> Self {
        DomainError::NotFound("User".to_string(), id.to_string())
    }

    pub fn post_not_found(id: impl ToString) -> Self {
        DomainError::NotFound("Post".to_string(), id.to_string())
    }

    /// True for failures the caller may reasonably retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::TransientStore(_))
    }
}

/// A specialized Result type for the social core.
pub type Result<T> = std::result::Result<T, DomainError>;
