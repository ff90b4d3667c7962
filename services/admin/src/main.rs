use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use admin::AppState;
use admin::auth::Authenticator;
use admin::config::GatewayConfig;
use admin::jwt::{JwtConfig, JwtService};
use admin::models::{NewAdminUser, Role};
use admin::rate_limiter::{RateLimiter, RateLimiterConfig};
use admin::routes;
use admin::store::{PgStore, SessionStore};
use admin::sweep;
use admin::validation;
use common::database;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // `admin seed <username> <password> <email> <full name>` bootstraps the
    // superadmin account, then exits.
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "seed" {
        return seed(&args[2..]).await;
    }

    info!("starting admin gateway");

    // Fail at startup, not per request, when configuration is missing.
    let db_config = database::DatabaseConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;
    let config = GatewayConfig::from_env()?;

    let pool = database::init_pool(&db_config).await?;
    if !database::health_check(&pool).await? {
        anyhow::bail!("failed to connect to database");
    }
    info!("database connection successful");

    let store: Arc<dyn SessionStore> = Arc::new(PgStore::new(pool.clone()));
    let state = AppState {
        store: store.clone(),
        authenticator: Authenticator::new(store.clone()),
        jwt_service: JwtService::new(&jwt_config),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        config: config.clone(),
    };

    tokio::spawn(sweep::run_sweep_loop(store, config.sweep_interval));

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("admin gateway listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database::close_pool(&pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

/// Create or refresh the superadmin account.
async fn seed(args: &[String]) -> Result<()> {
    let [username, password, email, full_name] = args else {
        eprintln!("Usage: admin seed <username> <password> <email> <full-name>");
        std::process::exit(2);
    };

    validation::validate_username(username).map_err(|e| anyhow::anyhow!(e))?;
    validation::validate_password(password).map_err(|e| anyhow::anyhow!(e))?;
    validation::validate_email(email).map_err(|e| anyhow::anyhow!(e))?;

    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    let store = PgStore::new(pool.clone());
    let user = store
        .users()
        .upsert(&NewAdminUser {
            username: username.clone(),
            password: password.clone(),
            email: email.clone(),
            full_name: full_name.clone(),
            role: Role::Superadmin,
        })
        .await?;

    println!("seeded admin user '{}' ({})", user.username, user.id);

    database::close_pool(&pool).await;
    Ok(())
}
