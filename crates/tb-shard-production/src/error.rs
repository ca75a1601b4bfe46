//! Error types for the shard production subsystem.
//!
//! Production itself has no fallible operations (all inputs are internally
//! generated and all history is hard-capped); the only errors are
//! configuration errors surfaced at construction time.

use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Shard count must be at least 1.
    #[error("shard_count must be at least 1")]
    ZeroShardCount,

    /// Block interval must be at least 1 ms.
    #[error("block_interval_ms must be at least 1")]
    ZeroBlockInterval,

    /// Every shard needs a non-empty validator committee.
    #[error("validators_per_shard must be at least 1")]
    EmptyCommittee,

    /// Cross-shard ratio is a fraction of a block's transactions.
    #[error("cross_shard_ratio must be within [0, 1], got {0}")]
    RatioOutOfRange(f64),

    /// The per-block transaction cap must allow at least one transaction.
    #[error("max_tx_per_shard_block must be at least 1")]
    ZeroTxCap,

    /// The stats loop needs a non-zero cadence.
    #[error("stats_interval_ms must be at least 1")]
    ZeroStatsInterval,
}
