//! Route guard: session validation for protected paths
//!
//! Every request passes through here. Protected paths require a live
//! session; everything else is forwarded untouched. Validation failures,
//! store errors and timeouts all deny: no request proceeds on an error
//! path.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::AppState;
use crate::error::AuthError;
use crate::jwt::JwtService;
use crate::models::AdminUser;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "admin_session";

/// Identity headers forwarded to handlers on a valid session.
pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USERNAME: &str = "x-user-username";
pub const HEADER_ROLE: &str = "x-user-role";
pub const HEADER_AUTH_TOKEN: &str = "x-auth-token";

const LOGIN_PATH: &str = "/admin/login";
const ADMIN_PREFIX: &str = "/admin";

/// Paths never guarded: the auth API, framework assets, public files.
const EXEMPT_PREFIXES: &[&str] = &["/api/auth/", "/_next/static/", "/_next/image/", "/public/"];
const EXEMPT_PATHS: &[&str] = &["/favicon.ico"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path) || EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Whether a path requires a valid session. The login page is the one
/// admin path reachable without one.
fn is_protected(path: &str) -> bool {
    if path == LOGIN_PATH {
        return false;
    }
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

/// Gate every request on session state
pub async fn route_guard(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if is_exempt(&path) {
        return next.run(req).await;
    }

    let session_id = parse_cookie(req.headers(), SESSION_COOKIE);

    if path == LOGIN_PATH {
        // No double login: an authenticated admin skips the login page.
        if let Some(id) = &session_id {
            if let Ok(Some(_)) = validate_bounded(&state, id).await {
                return found(ADMIN_PREFIX);
            }
        }
        return next.run(req).await;
    }

    if !is_protected(&path) {
        return next.run(req).await;
    }

    let Some(session_id) = session_id else {
        return found(&format!("{}?redirect={}", LOGIN_PATH, path));
    };

    match validate_bounded(&state, &session_id).await {
        Ok(Some(user)) => {
            attach_identity(req.headers_mut(), &user, &state.jwt_service);
            next.run(req).await
        }
        Ok(None) => deny_and_clear(state.config.secure_cookies),
        Err(e) => {
            // The session may still be live; deny without discarding the
            // client's cookie.
            error!(error = %e, path = %path, "session validation failed, denying");
            found(LOGIN_PATH)
        }
    }
}

/// Validate a session id, bounded by the configured timeout.
///
/// A slow store denies the request instead of stalling it open-ended.
async fn validate_bounded(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AdminUser>, AuthError> {
    match tokio::time::timeout(
        state.config.validate_timeout,
        state.store.validate_session(session_id),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(AuthError::Internal(
            "session validation timed out".to_string(),
        )),
    }
}

/// Forward the authenticated identity to the downstream handler.
fn attach_identity(headers: &mut HeaderMap, user: &AdminUser, jwt: &JwtService) {
    if let Ok(value) = HeaderValue::from_str(&user.id.to_string()) {
        headers.insert(HEADER_USER_ID, value);
    }
    if let Ok(value) = HeaderValue::from_str(&user.username) {
        headers.insert(HEADER_USERNAME, value);
    }
    headers.insert(HEADER_ROLE, HeaderValue::from_static(user.role.as_str()));

    match jwt.issue(user.id, &user.username) {
        Ok(token) => {
            if let Ok(value) = HeaderValue::from_str(&token) {
                headers.insert(HEADER_AUTH_TOKEN, value);
            }
        }
        Err(e) => warn!(error = %e, "token mint failed, forwarding without token"),
    }
}

/// 302 redirect.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect to login and expire the client's cookie.
fn deny_and_clear(secure: bool) -> Response {
    let mut response = found(LOGIN_PATH);
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie(secure));
    response
}

/// Extract a cookie value from request headers.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

/// Build the session cookie for a login response.
///
/// HttpOnly, SameSite=Lax, path `/`; `Secure` when the gateway runs behind
/// TLS. The value is the opaque session id, nothing client-readable.
pub fn session_cookie(session_id: &str, secure: bool, max_age_secs: i64) -> HeaderValue {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, session_id, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).unwrap()
}

/// Expire the session cookie on the client.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    let mut cookie = format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE);
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).unwrap()
}
