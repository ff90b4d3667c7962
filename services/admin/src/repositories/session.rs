//! Session repository for database operations

use sqlx::PgPool;

use crate::error::AuthError;
use crate::models::{AdminSession, AdminUser};

use super::user::user_from_row;

/// Repository for `admin_sessions` rows
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one session row
    pub async fn insert(&self, session: &AdminSession) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO admin_sessions (id, user_id, expires_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the owning user of a live session in one joined query
    ///
    /// Expiry and the user's active flag are checked in SQL. The session
    /// row is read, never written: validation must not extend `expires_at`.
    pub async fn find_user_for_valid(
        &self,
        session_id: &str,
    ) -> Result<Option<AdminUser>, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.password_hash, u.email, u.full_name,
                   u.role, u.is_active, u.last_login, u.created_at
            FROM admin_sessions s
            JOIN admin_users u ON u.id = s.user_id
            WHERE s.id = $1 AND s.expires_at > NOW() AND u.is_active = TRUE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(AuthError::from)
    }

    /// Delete a session row. Deleting an unknown id is not an error.
    pub async fn delete(&self, session_id: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM admin_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Bulk-delete rows whose expiry has passed
    ///
    /// Returns the number of rows removed. Live rows are untouched.
    pub async fn delete_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
