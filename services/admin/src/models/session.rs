//! Session model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row in `admin_sessions`
///
/// A session is valid while `expires_at` is in the future and the owning
/// user is active. Expiry is derived from the clock at read time; nothing
/// marks a row expired in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSession {
    /// Opaque random identifier, also the cookie value.
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
