//! # TBURN Node Runtime
//!
//! Entry point for the TBURN node. Startup sequence:
//!
//! 1. Initialize logging (`RUST_LOG`-driven, defaults to `info`)
//! 2. Load configuration from the environment (`TB_*` variables)
//! 3. Construct the shared event bus, clock, producer, and coordinator
//! 4. `coordinator.start()` brings everything up in dependency order
//! 5. Run until Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use node_runtime::{LocalShardOrchestrator, LoopbackRouter, NodeConfig};
use shared_bus::InMemoryEventBus;
use shared_types::clock::{Clock, SystemClock};
use std::sync::Arc;
use tb_shard_coordination::ShardCoordinator;
use tb_shard_production::ParallelShardProducer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = NodeConfig::from_env();
    config
        .producer
        .validate()
        .context("invalid producer configuration")?;

    info!("===========================================");
    info!("  TBURN Node Runtime v{}", shared_types::VERSION);
    info!("  Shards: {}", config.producer.shard_count);
    info!("  Block interval: {}ms", config.producer.block_interval_ms);
    info!("===========================================");

    let bus = Arc::new(InMemoryEventBus::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let producer = Arc::new(ParallelShardProducer::new(
        config.producer.clone(),
        Arc::clone(&bus),
        Arc::clone(&clock),
    ));
    let coordinator = ShardCoordinator::new(
        config.coordinator.clone(),
        bus,
        clock,
        Arc::new(LocalShardOrchestrator),
        Arc::new(LoopbackRouter::new(config.producer.shard_count)),
        Some(producer),
    )
    .context("failed to wire coordinator")?;

    coordinator
        .start()
        .await
        .context("coordinator startup failed")?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    coordinator.stop().await;
    info!("Shutdown complete");

    Ok(())
}
