//! Credential verification and session minting

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::{AdminUser, NewActivityEntry};
use crate::password;
use crate::store::SessionStore;

/// Owns the login decision: credential check, last-login stamp, audit trail
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn SessionStore>,
}

impl Authenticator {
    /// Create a new authenticator over an injected store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Verify credentials and return the sanitized user on success
    ///
    /// Unknown username, inactive account and wrong password all yield
    /// `Ok(None)`; the caller cannot tell which occurred. Store failures
    /// propagate.
    pub async fn login(
        &self,
        username: &str,
        password_input: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<AdminUser>, AuthError> {
        let Some(user) = self.store.find_active_user(username).await? else {
            return Ok(None);
        };

        if !password::verify(password_input, &user.password_hash) {
            return Ok(None);
        }

        self.store.touch_last_login(user.id).await?;
        info!(username = %user.username, "admin login");

        self.log_activity(user.id, "login", "auth", None, None, ip, user_agent)
            .await;

        Ok(Some(user.sanitized()))
    }

    /// Best-effort audit append
    ///
    /// Failures are logged and swallowed; the calling operation proceeds.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_activity(
        &self,
        user_id: Uuid,
        action: &str,
        resource: &str,
        resource_id: Option<&str>,
        details: Option<&str>,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) {
        let entry = NewActivityEntry {
            user_id,
            action: action.to_string(),
            resource: resource.to_string(),
            resource_id: resource_id.map(str::to_string),
            details: details.map(str::to_string),
            ip_address: ip.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
        };

        if let Err(e) = self.store.record_activity(&entry).await {
            warn!(error = %e, action = %entry.action, "failed to record activity");
        }
    }
}
