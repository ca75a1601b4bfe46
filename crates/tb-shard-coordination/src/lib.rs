//! # TB Shard Coordination
//!
//! Cross-shard coordination layer for the TBURN chain.
//!
//! ## Purpose
//!
//! Own the startup/shutdown ordering of the production-side services,
//! bridge produced blocks into cross-shard routing work, and expose
//! combined operational metrics:
//!
//! - Lifecycle ordering: orchestrator, then router, then producer; torn
//!   down in reverse
//! - A single bus listener that turns each produced block's cross-shard
//!   units into routed messages (exclusion-sampled target, weighted
//!   priority)
//! - Fire-and-forget routing with rate-limited failure diagnostics
//! - A periodic metrics loop deriving per-shard TPS estimates
//!
//! ## Module Structure
//!
//! ```text
//! tb-shard-coordination/
//! ├── config/         # CoordinatorConfig
//! ├── domain/         # target sampling, priority assignment, synthesis
//! ├── metrics/        # lock-free interval counters
//! ├── ports/          # ShardOrchestrator, CrossShardRouter (+ mocks)
//! └── service/        # ShardCoordinator lifecycle + routing
//! ```
//!
//! Routing is at-most-once: failures are counted and logged, never
//! retried.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::CoordinatorConfig;
pub use error::CoordinationError;
pub use ports::{CrossShardRouter, MessageOptions, RouterStats, ShardOrchestrator};
pub use service::ShardCoordinator;

/// Time-to-live attached to every routed cross-shard message (milliseconds).
pub const MESSAGE_TTL_MS: u64 = 30_000;

/// Routing failures are logged once per this many occurrences.
pub const FAILURE_LOG_INTERVAL: u64 = 100;
