//! End-to-end cookie flows for the route guard and auth endpoints
//!
//! Drives the real router with an in-memory store, so no database is
//! required: login sets the cookie, the guard validates it, logout and
//! expiry invalidate it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use admin::AppState;
use admin::auth::Authenticator;
use admin::config::GatewayConfig;
use admin::error::AuthError;
use admin::jwt::{JwtConfig, JwtService};
use admin::models::{AdminSession, AdminUser, NewActivityEntry, Role};
use admin::password;
use admin::rate_limiter::{RateLimiter, RateLimiterConfig};
use admin::routes::create_router;
use admin::store::{SessionStore, generate_session_id};

const USERNAME: &str = "root";
const PASSWORD: &str = "correct horse battery staple";

/// In-memory stand-in for the PostgreSQL store.
#[derive(Default)]
struct MemoryStore {
    users: Mutex<Vec<AdminUser>>,
    sessions: Mutex<HashMap<String, AdminSession>>,
    activity: Mutex<Vec<NewActivityEntry>>,
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, AuthError> {
        let id = generate_session_id();
        self.sessions.lock().unwrap().insert(
            id.clone(),
            AdminSession {
                id: id.clone(),
                user_id,
                expires_at: Utc::now() + chrono::Duration::hours(24),
                ip_address: ip.map(str::to_string),
                user_agent: user_agent.map(str::to_string),
            },
        );
        Ok(id)
    }

    async fn validate_session(&self, session_id: &str) -> Result<Option<AdminUser>, AuthError> {
        let sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.get(session_id) else {
            return Ok(None);
        };
        if session.expires_at <= Utc::now() {
            return Ok(None);
        }
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.id == session.user_id && u.is_active)
            .cloned())
    }

    async fn destroy_session(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > Utc::now());
        Ok((before - sessions.len()) as u64)
    }

    async fn find_active_user(&self, username: &str) -> Result<Option<AdminUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.username == username && u.is_active)
            .cloned())
    }

    async fn touch_last_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn record_activity(&self, entry: &NewActivityEntry) -> Result<(), AuthError> {
        self.activity.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::default();
    store.users.lock().unwrap().push(AdminUser {
        id: Uuid::new_v4(),
        username: USERNAME.to_string(),
        password_hash: password::hash(PASSWORD).unwrap(),
        email: "root@example.com".to_string(),
        full_name: "Root Admin".to_string(),
        role: Role::Superadmin,
        is_active: true,
        last_login: None,
        created_at: Utc::now(),
    });
    Arc::new(store)
}

fn test_app(store: Arc<MemoryStore>) -> Router {
    test_app_with_limits(store, 1000)
}

fn test_app_with_limits(store: Arc<MemoryStore>, max_attempts: u32) -> Router {
    let store: Arc<dyn SessionStore> = store;
    create_router(AppState {
        store: store.clone(),
        authenticator: Authenticator::new(store),
        jwt_service: JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: 3600,
        }),
        rate_limiter: RateLimiter::new(RateLimiterConfig {
            max_attempts,
            ..RateLimiterConfig::default()
        }),
        config: GatewayConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            secure_cookies: false,
            validate_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(3600),
        },
    })
}

async fn login_request(app: &Router, username: &str, password: &str) -> Response<Body> {
    let body = serde_json::json!({ "username": username, "password": password }).to_string();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_with_cookie(app: &Router, uri: &str, session_id: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = session_id {
        builder = builder.header(header::COOKIE, format!("admin_session={}", id));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Session id from a response's Set-Cookie header.
fn session_cookie_value(response: &Response<Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?;
    let value = pair.strip_prefix("admin_session=")?;
    Some(value.to_string())
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_verifiable_token() {
    let app = test_app(seeded_store());

    let response = login_request(&app, USERNAME, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("admin_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let session_id = session_cookie_value(&response).unwrap();
    assert!(!session_id.is_empty());

    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], USERNAME);
    assert!(body["user"].get("password_hash").is_none());

    let jwt = JwtService::new(&JwtConfig {
        secret: "test-secret".to_string(),
        token_expiry: 3600,
    });
    let claims = jwt
        .verify(body["token"].as_str().unwrap())
        .expect("login token should verify");
    assert_eq!(claims.username, USERNAME);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_are_indistinguishable() {
    let app = test_app(seeded_store());

    let wrong_password = login_request(&app, USERNAME, "not the password").await;
    let unknown_user = login_request(&app, "nobody", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());

    let first = body_json(wrong_password).await;
    let second = body_json(unknown_user).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_inactive_user_cannot_login() {
    let store = seeded_store();
    store.users.lock().unwrap()[0].is_active = false;
    let app = test_app(store);

    let response = login_request(&app, USERNAME, PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_without_cookie_redirects_with_original_path() {
    let app = test_app(seeded_store());

    let response = get_with_cookie(&app, "/admin", None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login?redirect=/admin"
    );

    let deep = get_with_cookie(&app, "/admin/users", None).await;
    assert_eq!(
        deep.headers().get(header::LOCATION).unwrap(),
        "/admin/login?redirect=/admin/users"
    );
}

#[tokio::test]
async fn test_admin_with_valid_cookie_forwards_identity() {
    let app = test_app(seeded_store());

    let login = login_request(&app, USERNAME, PASSWORD).await;
    let session_id = session_cookie_value(&login).unwrap();

    let response = get_with_cookie(&app, "/admin", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], USERNAME);
    assert_eq!(body["role"], "superadmin");
    assert!(!body["user_id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_cookie_redirects_and_clears() {
    let app = test_app(seeded_store());

    let response = get_with_cookie(&app, "/admin", Some("no-such-session")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("admin_session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_expired_session_row_is_invalid() {
    let store = seeded_store();
    let user_id = store.users.lock().unwrap()[0].id;

    let session_id = generate_session_id();
    store.sessions.lock().unwrap().insert(
        session_id.clone(),
        AdminSession {
            id: session_id.clone(),
            user_id,
            expires_at: Utc::now() - chrono::Duration::hours(1),
            ip_address: None,
            user_agent: None,
        },
    );

    let app = test_app(store);
    let response = get_with_cookie(&app, "/admin", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/admin/login"
    );
}

#[tokio::test]
async fn test_deactivated_user_invalidates_live_session() {
    let store = seeded_store();
    let app = test_app(store.clone());

    let login = login_request(&app, USERNAME, PASSWORD).await;
    let session_id = session_cookie_value(&login).unwrap();

    store.users.lock().unwrap()[0].is_active = false;

    let response = get_with_cookie(&app, "/admin", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_authenticated_login_page_redirects_to_admin() {
    let app = test_app(seeded_store());

    let login = login_request(&app, USERNAME, PASSWORD).await;
    let session_id = session_cookie_value(&login).unwrap();

    let response = get_with_cookie(&app, "/admin/login", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/admin");
}

#[tokio::test]
async fn test_unauthenticated_login_page_renders() {
    let app = test_app(seeded_store());

    let response = get_with_cookie(&app, "/admin/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stale = get_with_cookie(&app, "/admin/login", Some("stale-session")).await;
    assert_eq!(stale.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_destroys_session() {
    let app = test_app(seeded_store());

    let login = login_request(&app, USERNAME, PASSWORD).await;
    let session_id = session_cookie_value(&login).unwrap();

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, format!("admin_session={}", session_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
    let cleared = logout
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));

    // The destroyed session no longer opens the dashboard.
    let response = get_with_cookie(&app, "/admin", Some(&session_id)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = test_app(seeded_store());

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, "admin_session=never-existed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_endpoint() {
    let app = test_app(seeded_store());

    let anonymous = get_with_cookie(&app, "/api/auth/me", None).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let login = login_request(&app, USERNAME, PASSWORD).await;
    let session_id = session_cookie_value(&login).unwrap();

    let me = get_with_cookie(&app, "/api/auth/me", Some(&session_id)).await;
    assert_eq!(me.status(), StatusCode::OK);
    let body = body_json(me).await;
    assert_eq!(body["user"]["username"], USERNAME);
}

#[tokio::test]
async fn test_exempt_paths_bypass_guard() {
    let app = test_app(seeded_store());

    // No session, but no redirect either: these fall through to routing.
    for uri in ["/favicon.ico", "/public/robots.txt", "/_next/static/x.js"] {
        let response = get_with_cookie(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
    }

    let health = get_with_cookie(&app, "/health", None).await;
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rate_limited_after_budget() {
    let app = test_app_with_limits(seeded_store(), 2);

    // The limiter keys on the forwarded client IP; absent headers fall into
    // one shared bucket.
    let first = login_request(&app, USERNAME, "bad").await;
    let second = login_request(&app, USERNAME, "bad").await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);

    let third = login_request(&app, USERNAME, PASSWORD).await;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
}
