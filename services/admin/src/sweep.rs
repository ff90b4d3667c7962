//! Periodic removal of expired session rows
//!
//! Expiry is derived from the clock at validation time, so a dead row is
//! already invisible; this loop only keeps the table from accumulating
//! them. Runs decoupled from request handling and tolerates store
//! failures.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::store::SessionStore;

/// Run the sweep loop. Never returns; spawn it as a task.
pub async fn run_sweep_loop(store: Arc<dyn SessionStore>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // interval's first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match store.sweep_expired().await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "swept expired sessions"),
            Err(e) => error!(error = %e, "session sweep failed"),
        }
    }
}
