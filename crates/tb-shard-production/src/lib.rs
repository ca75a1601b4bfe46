//! # TB Shard Production
//!
//! Sharded parallel block production engine for the TBURN chain.
//!
//! ## Purpose
//!
//! Drive N independent per-shard block production loops at a configured
//! cadence, convert target TPS into per-block transaction counts, and
//! maintain bounded-memory throughput telemetry:
//!
//! - One tokio task per shard, with a small random jitter added to the base
//!   interval so the loops do not all fire in the same scheduler tick
//! - Per-shard sliding TPS windows bounded by both duration and entry count
//! - A lower-frequency global stats loop (history cap, peak tracking)
//! - Graceful stop, synchronous emergency stop, and a lighter memory
//!   cleanup valve for pressure situations
//!
//! ## Module Structure
//!
//! ```text
//! tb-shard-production/
//! ├── config/         # ProducerConfig + safe-mode preset
//! ├── domain/         # ShardState, TPS window, committee, hashing
//! └── service/        # ParallelShardProducer lifecycle + loops
//! ```
//!
//! This engine schedules and accounts for shard work; it does not execute
//! transactions. Blocks are handed off via `shard-bus` events.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ProducerConfig;
pub use domain::{deterministic_committee, ShardState, TpsSample};
pub use error::ConfigError;
pub use service::ParallelShardProducer;

/// Duration bound of the per-shard TPS sliding window (milliseconds).
pub const TPS_WINDOW_MS: u64 = 10_000;

/// Hard cap on entries retained in a per-shard TPS window.
pub const MAX_WINDOW_ENTRIES: usize = 128;

/// Span used when recomputing `current_tps` from the window (milliseconds).
pub const CURRENT_TPS_SPAN_MS: u64 = 1_000;

/// Hard cap on the global TPS history ring.
pub const TPS_HISTORY_MAX: usize = 60;

/// Upper bound of the per-shard scheduling jitter (milliseconds).
pub const MAX_JITTER_MS: u64 = 50;

/// Window entries retained by `force_memory_cleanup`.
pub const CLEANUP_RETAINED_ENTRIES: usize = 32;

/// Synthetic gas accounting per transaction.
pub const GAS_PER_TX: u64 = 21_000;

/// Block gas limit.
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
