//! Configuration types for shard block production.

use crate::error::ConfigError;
use serde::Deserialize;

/// Runtime configuration for the parallel shard producer.
///
/// Resolved once at process start; not hot-reloadable.
#[derive(Clone, Debug, Deserialize)]
pub struct ProducerConfig {
    /// Number of independently producing shards.
    pub shard_count: u16,

    /// Base block production interval per shard (milliseconds). A random
    /// jitter of up to `MAX_JITTER_MS` is added per shard at start.
    pub block_interval_ms: u64,

    /// Target sustained TPS per shard; converted into a per-block
    /// transaction target at the configured cadence.
    pub target_tps_per_shard: u64,

    /// Hard cap on transactions accounted to a single shard block.
    pub max_tx_per_shard_block: u32,

    /// Fraction of each block's transactions that require cross-shard
    /// routing (floor applied).
    pub cross_shard_ratio: f64,

    /// Cadence of the global stats collection loop (milliseconds).
    pub stats_interval_ms: u64,

    /// Size of each shard's fixed validator committee.
    pub validators_per_shard: usize,

    /// Base genesis block offset; shard `s` starts at
    /// `genesis_block_offset + s`.
    pub genesis_block_offset: u64,

    /// Optional RNG seed for deterministic jitter and variance in tests.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            shard_count: 24,
            block_interval_ms: 100,
            target_tps_per_shard: 4_200,
            max_tx_per_shard_block: 2_000,
            cross_shard_ratio: 0.15,
            stats_interval_ms: 2_000,
            validators_per_shard: 7,
            genesis_block_offset: 0,
            rng_seed: None,
        }
    }
}

impl ProducerConfig {
    /// Lower-throughput, longer-interval parameter set for non-production
    /// environments (SAFE_MODE).
    #[must_use]
    pub fn safe_mode() -> Self {
        Self {
            shard_count: 4,
            block_interval_ms: 2_000,
            target_tps_per_shard: 1_000,
            max_tx_per_shard_block: 2_000,
            stats_interval_ms: 5_000,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shard_count == 0 {
            return Err(ConfigError::ZeroShardCount);
        }
        if self.block_interval_ms == 0 {
            return Err(ConfigError::ZeroBlockInterval);
        }
        if self.validators_per_shard == 0 {
            return Err(ConfigError::EmptyCommittee);
        }
        if !(0.0..=1.0).contains(&self.cross_shard_ratio) {
            return Err(ConfigError::RatioOutOfRange(self.cross_shard_ratio));
        }
        if self.max_tx_per_shard_block == 0 {
            return Err(ConfigError::ZeroTxCap);
        }
        if self.stats_interval_ms == 0 {
            return Err(ConfigError::ZeroStatsInterval);
        }
        Ok(())
    }

    /// Per-block transaction target before variance and clipping.
    #[must_use]
    pub fn tx_per_block_target(&self) -> f64 {
        let blocks_per_second = 1_000.0 / self.block_interval_ms as f64;
        self.target_tps_per_shard as f64 / blocks_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ProducerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shard_count, 24);
        assert_eq!(config.block_interval_ms, 100);
    }

    #[test]
    fn test_safe_mode_is_slower() {
        let safe = ProducerConfig::safe_mode();
        let normal = ProducerConfig::default();
        assert!(safe.validate().is_ok());
        assert!(safe.block_interval_ms > normal.block_interval_ms);
        assert!(safe.target_tps_per_shard < normal.target_tps_per_shard);
        assert!(safe.shard_count < normal.shard_count);
    }

    #[test]
    fn test_tx_per_block_target() {
        // 4200 TPS at 10 blocks/s -> 420 tx per block.
        let config = ProducerConfig::default();
        assert!((config.tx_per_block_target() - 420.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_zero_shards() {
        let config = ProducerConfig {
            shard_count: 0,
            ..ProducerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroShardCount));
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let config = ProducerConfig {
            cross_shard_ratio: 1.5,
            ..ProducerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::RatioOutOfRange(1.5)));
    }

    #[test]
    fn test_validate_rejects_empty_committee() {
        let config = ProducerConfig {
            validators_per_shard: 0,
            ..ProducerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyCommittee));
    }
}
