// server/src/main.rs

// Entry point: config load, store and service bootstrap, demo data seed.
// Routing/transport is attached externally; this binary keeps the wired
// services alive until a shutdown signal arrives.

use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};

use hospital_api::Api;
use hospital_models::CoreConfig;
use hospital_services::{load_demo_data, HmacSha256Hasher, PasswordHasher};
use hospital_storage::{HospitalStore, InMemoryStore};

const CONFIG_PATH: &str = "hospital.yaml";
const SECRET_ENV: &str = "HOSPITAL_PASSWORD_SECRET";

async fn handle_signals() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("failed to set up SIGTERM handler: {e}");
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            log::error!("failed to set up SIGINT handler: {e}");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = CoreConfig::load(Path::new(CONFIG_PATH))
        .with_context(|| format!("loading {CONFIG_PATH}"))?;
    info!(
        "config: horizon={}d, low-stock threshold={}, audit page={}",
        config.scheduling_horizon_days, config.low_stock_threshold, config.audit_page_size
    );

    let secret = std::env::var(SECRET_ENV).unwrap_or_else(|_| "dev-only-secret".to_string());
    let store: Arc<dyn HospitalStore> = Arc::new(InMemoryStore::new());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(HmacSha256Hasher::new(secret.as_bytes()));

    let seed = load_demo_data(&store, &hasher)
        .await
        .context("seeding demo data")?;
    info!(
        "sites ready: {} (central) and {}",
        seed.site_north.name, seed.site_south.name
    );

    let _api = Api::new(store, hasher, config);
    info!("hospital services wired; waiting for shutdown signal");

    handle_signals().await;
    Ok(())
}
