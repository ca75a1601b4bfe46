//! # Core Domain Entities
//!
//! Defines the entities flowing between the shard block producer and the
//! cross-shard coordinator, plus the read-only stats snapshots consumed by
//! REST adapters and dashboards.
//!
//! Snapshots (`ParallelProducerStats`, `CoordinatorStats`, `FailureStats`)
//! are derived views assembled on demand. They own nothing and must never
//! be treated as a source of truth by consumers.

use serde::{Deserialize, Serialize};

/// Shard identifier (u16 supports up to 65536 shards).
pub type ShardId = u16;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 20-byte validator address.
pub type Address = [u8; 20];

// =============================================================================
// CLUSTER A: SHARD PRODUCTION
// =============================================================================

/// A block produced by one shard's production loop.
///
/// Value object: created per tick, emitted on the bus, and not retained by
/// the producer beyond chaining `parent_hash` to the next block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBlock {
    /// The shard this block belongs to.
    pub shard_id: ShardId,
    /// Block height within the shard's own chain.
    pub block_number: u64,
    /// Block hash.
    pub hash: Hash,
    /// Hash of the previous block of the same shard.
    pub parent_hash: Hash,
    /// Synthetic state root (placeholder for the execution engine's output).
    pub state_root: Hash,
    /// Production timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// The validator that proposed this block (round-robin over the committee).
    pub proposer: Address,
    /// Number of transactions accounted to this block.
    pub transaction_count: u32,
    /// Number of transactions that require cross-shard routing.
    pub cross_shard_tx_count: u32,
    /// Gas consumed by the block's transactions.
    pub gas_used: u64,
    /// Block gas limit.
    pub gas_limit: u64,
}

/// Per-shard production state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardProductionSnapshot {
    /// The shard this snapshot describes.
    pub shard_id: ShardId,
    /// Current block height.
    pub block_number: u64,
    /// Blocks produced since the last lifecycle reset.
    pub blocks_produced: u64,
    /// Transactions accounted since the last lifecycle reset.
    pub tx_processed: u64,
    /// Cross-shard transactions accounted since the last lifecycle reset.
    pub cross_shard_tx: u64,
    /// Transactions per second over the last second.
    pub current_tps: u64,
    /// Size of the shard's validator committee.
    pub validator_count: usize,
    /// Entries currently retained in the TPS sliding window.
    pub tps_window_len: usize,
}

/// Aggregate producer stats across all shards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelProducerStats {
    /// Whether production loops are currently scheduled.
    pub is_running: bool,
    /// Number of shards driven by the producer.
    pub shard_count: u16,
    /// Sum of per-shard blocks produced.
    pub total_blocks_produced: u64,
    /// Sum of per-shard transactions accounted.
    pub total_tx_processed: u64,
    /// Sum of per-shard cross-shard transactions.
    pub total_cross_shard_tx: u64,
    /// Sum of per-shard current TPS.
    pub current_tps: u64,
    /// Highest global TPS observed since start.
    pub peak_tps: u64,
    /// Per-shard snapshots, indexed by shard id.
    pub shards: Vec<ShardProductionSnapshot>,
}

// =============================================================================
// CLUSTER B: CROSS-SHARD COORDINATION
// =============================================================================

/// Delivery priority for cross-shard messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessagePriority {
    /// Consensus-critical traffic, always drained first.
    Critical,
    /// Latency-sensitive traffic.
    High,
    /// Default priority.
    Normal,
    /// Bulk / background traffic.
    Low,
}

/// A coordinator-synthesized transaction.
///
/// Ephemeral: exists only for the duration of a routing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTransaction {
    /// Unique transaction id (UUID v4).
    pub id: String,
    /// Originating shard.
    pub source_shard: ShardId,
    /// Destination shard. Invariant: differs from `source_shard` when
    /// `is_cross_shard` is set.
    pub target_shard: ShardId,
    /// Whether this transaction's effects leave its originating shard.
    pub is_cross_shard: bool,
    /// Delivery priority.
    pub priority: MessagePriority,
    /// Synthesis timestamp in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Opaque payload handed to the cross-shard router.
    pub payload: Vec<u8>,
}

/// Result of the legacy synchronous `process_block` path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardBlockData {
    /// Block height as reported by the caller.
    pub block_number: u64,
    /// The shard the block belongs to.
    pub shard_id: ShardId,
    /// Total transactions in the block.
    pub transaction_count: u32,
    /// The cross-shard transactions synthesized from the block.
    pub cross_shard_transactions: Vec<ShardTransaction>,
}

/// Coordinator-level metrics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorStats {
    /// Whether the coordinator is running.
    pub is_running: bool,
    /// Total transactions observed across all handled blocks.
    pub total_transactions_routed: u64,
    /// Cross-shard messages handed to the router.
    pub cross_shard_messages_routed: u64,
    /// Cross-shard messages the router rejected.
    pub cross_shard_messages_failed: u64,
    /// Per-shard TPS estimates, indexed by shard id.
    pub shard_tps: Vec<u64>,
    /// Median router delivery latency in milliseconds.
    pub router_latency_p50_ms: f64,
    /// Messages queued router-side awaiting delivery.
    pub router_queue_depth: u64,
}

/// Routing success/failure summary derived from coordinator counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureStats {
    /// Messages handed to the router.
    pub routed: u64,
    /// Messages the router rejected.
    pub failed: u64,
    /// `routed / (routed + failed) * 100`; 100.0 when nothing was attempted.
    pub success_rate: f64,
}

impl FailureStats {
    /// Derive the summary from raw counters.
    #[must_use]
    pub fn from_counters(routed: u64, failed: u64) -> Self {
        let attempted = routed + failed;
        let success_rate = if attempted == 0 {
            100.0
        } else {
            routed as f64 / attempted as f64 * 100.0
        };
        Self {
            routed,
            failed,
            success_rate,
        }
    }
}
