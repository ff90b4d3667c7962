//! Dependency-injected store seam for the authentication layer
//!
//! The route guard and authenticator talk to `dyn SessionStore`. The
//! concrete store is constructed once in `main` and passed down through
//! application state; request handling never reaches for a global client.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{AdminSession, AdminUser, NewActivityEntry};
use crate::repositories::{ActivityLogRepository, SessionRepository, UserRepository};

/// Session lifetime in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Generate an opaque, high-entropy session identifier.
///
/// 32 random bytes, url-safe base64 (43 characters), valid in cookie
/// values and URLs without escaping.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Storage operations behind the authentication layer
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session and return its opaque id.
    async fn create_session(
        &self,
        user_id: Uuid,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, AuthError>;

    /// Resolve a session id to its owning user.
    ///
    /// `None` when the session is absent, expired, or owned by an inactive
    /// user; callers cannot distinguish the three. Never extends expiry.
    async fn validate_session(&self, session_id: &str) -> Result<Option<AdminUser>, AuthError>;

    /// Delete a session. Idempotent: unknown ids are not an error.
    async fn destroy_session(&self, session_id: &str) -> Result<(), AuthError>;

    /// Bulk-delete expired sessions; returns the number of rows removed.
    async fn sweep_expired(&self) -> Result<u64, AuthError>;

    /// Look up an active user by username.
    async fn find_active_user(&self, username: &str) -> Result<Option<AdminUser>, AuthError>;

    /// Stamp the user's last-login time.
    async fn touch_last_login(&self, user_id: Uuid) -> Result<(), AuthError>;

    /// Append one audit record.
    async fn record_activity(&self, entry: &NewActivityEntry) -> Result<(), AuthError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    users: UserRepository,
    sessions: SessionRepository,
    activity: ActivityLogRepository,
}

impl PgStore {
    /// Build a store over an established connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            activity: ActivityLogRepository::new(pool),
        }
    }

    /// Direct access to the user repository, for the seed step
    pub fn users(&self) -> &UserRepository {
        &self.users
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, AuthError> {
        let session = AdminSession {
            id: generate_session_id(),
            user_id,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
            ip_address: ip.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
        };

        self.sessions.insert(&session).await?;
        Ok(session.id)
    }

    async fn validate_session(&self, session_id: &str) -> Result<Option<AdminUser>, AuthError> {
        self.sessions.find_user_for_valid(session_id).await
    }

    async fn destroy_session(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.delete(session_id).await
    }

    async fn sweep_expired(&self) -> Result<u64, AuthError> {
        self.sessions.delete_expired().await
    }

    async fn find_active_user(&self, username: &str) -> Result<Option<AdminUser>, AuthError> {
        self.users.find_active_by_username(username).await
    }

    async fn touch_last_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.users.touch_last_login(user_id).await
    }

    async fn record_activity(&self, entry: &NewActivityEntry) -> Result<(), AuthError> {
        self.activity.insert(entry).await
    }
}
