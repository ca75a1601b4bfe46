//! In-process implementations of the coordination ports.
//!
//! A single-node deployment has no external orchestrator or transport, so
//! both ports are satisfied locally: lifecycle is a log line, and routed
//! messages terminate in per-shard delivery counters.

use async_trait::async_trait;
use shared_types::{MessagePriority, ShardId};
use std::sync::atomic::{AtomicU64, Ordering};
use tb_shard_coordination::{CoordinationError, CrossShardRouter, MessageOptions, RouterStats};
use tb_shard_coordination::ShardOrchestrator;
use tracing::{debug, info};

/// Orchestrator port for a single-node deployment: nothing to bring up.
#[derive(Debug, Default)]
pub struct LocalShardOrchestrator;

#[async_trait]
impl ShardOrchestrator for LocalShardOrchestrator {
    async fn start(&self) -> Result<(), CoordinationError> {
        info!("[node] Local shard orchestrator online");
        Ok(())
    }
}

/// Router port that delivers in-process: every message lands in a
/// per-shard counter instead of crossing a network.
pub struct LoopbackRouter {
    delivered: Vec<AtomicU64>,
    total_delivered: AtomicU64,
}

impl LoopbackRouter {
    /// A loopback router for `shard_count` shards.
    #[must_use]
    pub fn new(shard_count: u16) -> Self {
        Self {
            delivered: (0..shard_count).map(|_| AtomicU64::new(0)).collect(),
            total_delivered: AtomicU64::new(0),
        }
    }

    /// Messages delivered to `shard_id` so far.
    #[must_use]
    pub fn delivered_to(&self, shard_id: ShardId) -> u64 {
        self.delivered
            .get(usize::from(shard_id))
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Total messages delivered.
    #[must_use]
    pub fn total_delivered(&self) -> u64 {
        self.total_delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CrossShardRouter for LoopbackRouter {
    async fn send_message(
        &self,
        source_shard: ShardId,
        target_shard: ShardId,
        _payload: Vec<u8>,
        priority: MessagePriority,
        options: MessageOptions,
    ) -> Result<(), CoordinationError> {
        let counter = self.delivered.get(usize::from(target_shard)).ok_or_else(|| {
            CoordinationError::RouterSend(format!("unknown target shard {target_shard}"))
        })?;
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_delivered.fetch_add(1, Ordering::Relaxed);
        debug!(
            "[node] Delivered {:?} message {} from shard {} to shard {}",
            priority, options.nonce, source_shard, target_shard
        );
        Ok(())
    }

    fn get_stats(&self) -> RouterStats {
        RouterStats {
            latency_p50_ms: 0.0,
            current_queue_depth: 0,
        }
    }
}
