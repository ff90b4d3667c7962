//! Admin user model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Admin identity record, as stored in `admin_users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    /// Cleared before the user leaves the authentication layer.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// This user with the password hash stripped, safe to hand to callers.
    pub fn sanitized(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// Seed payload for a new admin account
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdminUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}
