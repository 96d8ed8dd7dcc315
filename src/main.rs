//! apiwatch - scheduled HTTP API probing engine.
//!
//! Loads the persisted configuration, starts one probe loop per enabled
//! target and runs until interrupted.

use apiwatch::config::EngineConfig;
use apiwatch::engine::Engine;
use apiwatch::notify::LogNotifier;
use apiwatch::store::JsonStorage;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apiwatch=info".parse()?),
        )
        .init();

    let cfg = EngineConfig::load();
    tracing::info!("Starting apiwatch, data dir {}", cfg.data_dir.display());

    let storage = Arc::new(JsonStorage::new(cfg.data_dir.clone()));
    let engine = Engine::new(storage, Arc::new(LogNotifier));

    let targets = engine.state().targets();
    let enabled = targets.iter().filter(|t| t.enabled).count();
    tracing::info!("Loaded {} target(s), {} enabled", targets.len(), enabled);

    engine.start().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    engine.shutdown().await;

    Ok(())
}
