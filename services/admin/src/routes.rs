//! Admin gateway routes
//!
//! The auth endpoints live under `/api/auth/` and are exempt from the
//! route guard; the `/admin` pages are what the guard protects.

use axum::{
    Json, Router, middleware,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::AuthError;
use crate::middleware::{
    HEADER_ROLE, HEADER_USER_ID, HEADER_USERNAME, SESSION_COOKIE, clear_session_cookie,
    parse_cookie, route_guard, session_cookie,
};
use crate::models::AdminUser;
use crate::store::SESSION_TTL_HOURS;

/// Request for admin login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for admin login
#[derive(Serialize)]
pub struct LoginResponse {
    pub user: AdminUser,
    pub token: String,
}

/// Create the router for the admin gateway
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/admin", get(admin_dashboard))
        .route("/admin/login", get(login_page))
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "admin-gateway"
    }))
}

/// Admin login endpoint
///
/// Verifies credentials, persists a session and sets the session cookie.
/// Bad credentials are one undifferentiated 401.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let ip = client_ip(&headers);
    let user_agent = user_agent(&headers);

    if !state
        .rate_limiter
        .is_allowed(ip.as_deref().unwrap_or("unknown"))
        .await
    {
        return Err(AuthError::RateLimited);
    }

    let Some(user) = state
        .authenticator
        .login(&payload.username, &payload.password, ip.as_deref(), user_agent)
        .await?
    else {
        return Err(AuthError::InvalidCredentials);
    };

    let session_id = state
        .store
        .create_session(user.id, ip.as_deref(), user_agent)
        .await?;
    let token = state.jwt_service.issue(user.id, &user.username)?;

    let mut response = (StatusCode::OK, Json(LoginResponse { user, token })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        session_cookie(
            &session_id,
            state.config.secure_cookies,
            SESSION_TTL_HOURS * 3600,
        ),
    );

    Ok(response)
}

/// Admin logout endpoint
///
/// Destroys the session named by the cookie (idempotent) and expires the
/// cookie on the client.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AuthError> {
    if let Some(session_id) = parse_cookie(&headers, SESSION_COOKIE) {
        if let Ok(Some(user)) = state.store.validate_session(&session_id).await {
            state
                .authenticator
                .log_activity(
                    user.id,
                    "logout",
                    "auth",
                    None,
                    None,
                    client_ip(&headers).as_deref(),
                    user_agent(&headers),
                )
                .await;
            info!(username = %user.username, "admin logout");
        }

        state.store.destroy_session(&session_id).await?;
    }

    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        clear_session_cookie(state.config.secure_cookies),
    );

    Ok(response)
}

/// Identity echo for the current session
async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AuthError> {
    let session_id = parse_cookie(&headers, SESSION_COOKIE).ok_or(AuthError::InvalidSession)?;
    let user = state
        .store
        .validate_session(&session_id)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    Ok(Json(json!({ "user": user.sanitized() })).into_response())
}

/// Dashboard stub. Reads the identity headers the route guard attached.
async fn admin_dashboard(headers: HeaderMap) -> impl IntoResponse {
    let forwarded = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    Json(json!({
        "page": "dashboard",
        "user_id": forwarded(HEADER_USER_ID),
        "username": forwarded(HEADER_USERNAME),
        "role": forwarded(HEADER_ROLE),
    }))
}

/// Login page stub. Reachable only without a valid session.
async fn login_page() -> impl IntoResponse {
    Json(json!({ "page": "login" }))
}

/// Client IP as forwarded by the fronting proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
}
