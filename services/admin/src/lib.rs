//! Session authentication and route guarding for the admin dashboard
//!
//! Turns a username/password into a revocable, PostgreSQL-backed session
//! and decides on every request whether that session is valid and which
//! identity to forward downstream.

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod store;
pub mod sweep;
pub mod validation;

use std::sync::Arc;

use auth::Authenticator;
use config::GatewayConfig;
use jwt::JwtService;
use rate_limiter::RateLimiter;
use store::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub authenticator: Authenticator,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
    pub config: GatewayConfig,
}
