//! Coordinator configuration.

use crate::error::CoordinationError;
use crate::{FAILURE_LOG_INTERVAL, MESSAGE_TTL_MS};
use serde::{Deserialize, Serialize};

/// Coordination parameters, resolved once at process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Number of shards the coordinator tracks (must match the producer).
    pub shard_count: u16,

    /// Expected fraction of transactions that cross shards, used by the
    /// legacy inline `process_block` path.
    pub cross_shard_ratio: f64,

    /// Cadence of the metrics loop (milliseconds).
    pub metrics_interval_ms: u64,

    /// Whether the coordinator owns a parallel producer (subscribes to its
    /// blocks and drives its lifecycle).
    pub parallel_production_enabled: bool,

    /// TTL attached to every routed message (milliseconds).
    pub message_ttl_ms: u64,

    /// Log one routing-failure diagnostic per this many failures.
    pub failure_log_interval: u64,

    /// Seed for the sampling RNG. `None` uses entropy.
    pub rng_seed: Option<u64>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            shard_count: 24,
            cross_shard_ratio: 0.15,
            metrics_interval_ms: 1_000,
            parallel_production_enabled: true,
            message_ttl_ms: MESSAGE_TTL_MS,
            failure_log_interval: FAILURE_LOG_INTERVAL,
            rng_seed: None,
        }
    }
}

impl CoordinatorConfig {
    /// Validate ranges. Called once at construction.
    pub fn validate(&self) -> Result<(), CoordinationError> {
        if self.shard_count == 0 {
            return Err(CoordinationError::InvalidConfig(
                "shard_count must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.cross_shard_ratio) {
            return Err(CoordinationError::InvalidConfig(format!(
                "cross_shard_ratio {} outside [0, 1]",
                self.cross_shard_ratio
            )));
        }
        if self.metrics_interval_ms == 0 {
            return Err(CoordinationError::InvalidConfig(
                "metrics_interval_ms must be nonzero".into(),
            ));
        }
        if self.failure_log_interval == 0 {
            return Err(CoordinationError::InvalidConfig(
                "failure_log_interval must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CoordinatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_shards() {
        let config = CoordinatorConfig {
            shard_count: 0,
            ..CoordinatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_ratio_out_of_range() {
        let config = CoordinatorConfig {
            cross_shard_ratio: 1.5,
            ..CoordinatorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_log_interval() {
        let config = CoordinatorConfig {
            failure_log_interval: 0,
            ..CoordinatorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
