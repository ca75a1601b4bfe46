//! Node configuration, resolved once at process start.

use tb_shard_coordination::CoordinatorConfig;
use tb_shard_production::ProducerConfig;
use tracing::{info, warn};

/// Combined runtime configuration for producer and coordinator.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Block production parameters.
    pub producer: ProducerConfig,
    /// Coordination parameters.
    pub coordinator: CoordinatorConfig,
}

impl NodeConfig {
    /// Load configuration from the environment.
    ///
    /// `TB_SAFE_MODE=1` starts from the low-throughput preset; individual
    /// `TB_*` variables override single fields on top of either baseline.
    /// Malformed values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let safe_mode = env_flag("TB_SAFE_MODE");
        let mut producer = if safe_mode {
            info!("Safe mode enabled: low-throughput parameter set");
            ProducerConfig::safe_mode()
        } else {
            ProducerConfig::default()
        };
        let mut coordinator = CoordinatorConfig::default();

        if let Some(count) = env_parse::<u16>("TB_SHARD_COUNT") {
            producer.shard_count = count;
        }
        if let Some(interval) = env_parse::<u64>("TB_BLOCK_INTERVAL_MS") {
            producer.block_interval_ms = interval;
        }
        if let Some(tps) = env_parse::<u64>("TB_TARGET_TPS_PER_SHARD") {
            producer.target_tps_per_shard = tps;
        }
        if let Some(cap) = env_parse::<u32>("TB_MAX_TX_PER_SHARD_BLOCK") {
            producer.max_tx_per_shard_block = cap;
        }
        if let Some(ratio) = env_parse::<f64>("TB_CROSS_SHARD_RATIO") {
            producer.cross_shard_ratio = ratio;
        }
        if let Some(interval) = env_parse::<u64>("TB_METRICS_INTERVAL_MS") {
            coordinator.metrics_interval_ms = interval;
        }

        // The coordinator tracks the same shard layout the producer drives.
        coordinator.shard_count = producer.shard_count;
        coordinator.cross_shard_ratio = producer.cross_shard_ratio;

        Self {
            producer,
            coordinator,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring malformed {name}={raw}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aligns_producer_and_coordinator() {
        let config = NodeConfig::default();
        assert_eq!(
            config.producer.shard_count,
            config.coordinator.shard_count
        );
    }
}
