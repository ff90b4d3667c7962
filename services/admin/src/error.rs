//! Error types and Axum response conversions
//!
//! Credential and session failures are deliberately detail-free: a caller
//! can never distinguish "unknown user" from "wrong password", nor
//! "session missing" from "session expired".

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Authentication-layer errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad username or password. Never carries which one.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session missing, expired, or owned by an inactive user.
    #[error("invalid or expired session")]
    InvalidSession,

    /// Too many attempts from one client.
    #[error("rate limited")]
    RateLimited,

    /// Missing or malformed startup configuration. Fatal at boot, never
    /// produced per-request.
    #[error("configuration error: {0}")]
    Config(String),

    /// Hashing or signing failure inside the process.
    #[error("internal error: {0}")]
    Internal(String),

    /// The store rejected or could not serve an operation.
    #[error("store error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid or expired session"),
            AuthError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Too many login attempts"),
            AuthError::Config(msg) => {
                tracing::error!(error = %msg, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AuthError::Persistence(e) => {
                tracing::error!(error = %e, "store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
