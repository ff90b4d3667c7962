//! Activity log repository for database operations

use sqlx::PgPool;

use crate::error::AuthError;
use crate::models::NewActivityEntry;

/// Repository for `admin_activity_logs` rows. Append-only.
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    /// Create a new activity log repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit record
    pub async fn insert(&self, entry: &NewActivityEntry) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO admin_activity_logs
                (user_id, action, resource, resource_id, details, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.resource)
        .bind(&entry.resource_id)
        .bind(&entry.details)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
