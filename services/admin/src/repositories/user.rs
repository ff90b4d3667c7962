//! User repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{AdminUser, NewAdminUser, Role};
use crate::password;

const USER_COLUMNS: &str =
    "id, username, password_hash, email, full_name, role, is_active, last_login, created_at";

/// Map one `admin_users` row into an [`AdminUser`].
///
/// The role column is stored as text; an unknown value is a decode error,
/// not a silent default.
pub(crate) fn user_from_row(row: &PgRow) -> Result<AdminUser, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: e.into(),
        })?;

    Ok(AdminUser {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        role,
        is_active: row.try_get("is_active")?,
        last_login: row.try_get("last_login")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Repository for `admin_users` rows
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create or refresh an admin account by username
    ///
    /// Used by the seed step. The password is hashed here so plaintext
    /// never reaches the store.
    pub async fn upsert(&self, new_user: &NewAdminUser) -> Result<AdminUser, AuthError> {
        info!(username = %new_user.username, "seeding admin user");

        let password_hash = password::hash(&new_user.password)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO admin_users
                (id, username, password_hash, email, full_name, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW())
            ON CONFLICT (username) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                email = EXCLUDED.email,
                full_name = EXCLUDED.full_name,
                role = EXCLUDED.role,
                is_active = TRUE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        user_from_row(&row).map_err(AuthError::from)
    }

    /// Find an active user by username
    ///
    /// Inactive accounts are filtered in SQL so callers cannot tell an
    /// inactive user from an absent one.
    pub async fn find_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUser>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM admin_users WHERE username = $1 AND is_active = TRUE"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(AuthError::from)
    }

    /// Stamp the user's last-login time
    pub async fn touch_last_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE admin_users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
