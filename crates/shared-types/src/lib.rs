//! # Shared Types - Core Domain Entities for TBURN Chain
//!
//! Single Source of Truth for the types exchanged between the sharded
//! block-production engine, the cross-shard coordinator, and their
//! consumers (event bus subscribers, REST adapters).
//!
//! ## Clusters
//!
//! - **Shard production**: `ShardBlock`, `ShardProductionSnapshot`,
//!   `ParallelProducerStats`
//! - **Cross-shard coordination**: `ShardTransaction`, `MessagePriority`,
//!   `ShardBlockData`, `CoordinatorStats`, `FailureStats`
//! - **Infrastructure**: `Clock` time source abstraction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod clock;
pub mod entities;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{
    Address, CoordinatorStats, FailureStats, Hash, MessagePriority, ParallelProducerStats,
    ShardBlock, ShardBlockData, ShardId, ShardProductionSnapshot, ShardTransaction,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
