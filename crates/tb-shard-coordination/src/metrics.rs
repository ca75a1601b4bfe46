//! Lock-free coordinator counters.

use shared_types::{CoordinatorStats, FailureStats, ShardId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter block shared between the event listener, the routing tasks, and
/// the metrics loop. All fields are atomics; the per-shard array is sized
/// at construction and never reallocated.
pub struct CoordinatorMetrics {
    /// Transactions observed across all handled blocks.
    pub total_transactions_routed: AtomicU64,
    /// Cross-shard messages handed to the router.
    pub cross_shard_messages_routed: AtomicU64,
    /// Cross-shard messages the router rejected.
    pub cross_shard_messages_failed: AtomicU64,
    /// Routing-failure diagnostics actually logged (rate-limited).
    pub failure_logs_emitted: AtomicU64,
    /// Per-shard transaction counts accumulated over the current metrics
    /// interval, index-addressed by shard id.
    interval_tx: Vec<AtomicU64>,
    /// Per-shard TPS estimates from the last completed interval.
    last_shard_tps: parking_lot::Mutex<Vec<u64>>,
}

impl CoordinatorMetrics {
    /// Counters for `shard_count` shards, all zeroed.
    #[must_use]
    pub fn new(shard_count: u16) -> Self {
        Self {
            total_transactions_routed: AtomicU64::new(0),
            cross_shard_messages_routed: AtomicU64::new(0),
            cross_shard_messages_failed: AtomicU64::new(0),
            failure_logs_emitted: AtomicU64::new(0),
            interval_tx: (0..shard_count).map(|_| AtomicU64::new(0)).collect(),
            last_shard_tps: parking_lot::Mutex::new(vec![0; usize::from(shard_count)]),
        }
    }

    /// Account one handled block's transaction counts.
    pub fn record_block(&self, shard_id: ShardId, tx_count: u64, cross_count: u64) {
        self.total_transactions_routed
            .fetch_add(tx_count, Ordering::Relaxed);
        self.cross_shard_messages_routed
            .fetch_add(cross_count, Ordering::Relaxed);
        if let Some(counter) = self.interval_tx.get(usize::from(shard_id)) {
            counter.fetch_add(tx_count, Ordering::Relaxed);
        }
    }

    /// Count one routing failure. Returns the running failure total so the
    /// caller can apply its log rate limit.
    pub fn record_failure(&self) -> u64 {
        self.cross_shard_messages_failed
            .fetch_add(1, Ordering::SeqCst)
            + 1
    }

    /// Close the current interval: convert each shard's accumulated count
    /// into a TPS estimate, reset the counters, and retain the estimates.
    pub fn roll_interval(&self, elapsed_ms: u64) -> Vec<u64> {
        let elapsed_ms = elapsed_ms.max(1);
        let tps: Vec<u64> = self
            .interval_tx
            .iter()
            .map(|c| c.swap(0, Ordering::Relaxed) * 1_000 / elapsed_ms)
            .collect();
        *self.last_shard_tps.lock() = tps.clone();
        tps
    }

    /// Zero everything (graceful or emergency stop).
    pub fn reset(&self) {
        self.total_transactions_routed.store(0, Ordering::SeqCst);
        self.cross_shard_messages_routed.store(0, Ordering::SeqCst);
        self.cross_shard_messages_failed.store(0, Ordering::SeqCst);
        self.failure_logs_emitted.store(0, Ordering::SeqCst);
        for counter in &self.interval_tx {
            counter.store(0, Ordering::SeqCst);
        }
        for tps in self.last_shard_tps.lock().iter_mut() {
            *tps = 0;
        }
    }

    /// Current stats snapshot. The router-side fields are zeroed here; the
    /// coordinator fills them from the router port.
    #[must_use]
    pub fn snapshot(&self, is_running: bool) -> CoordinatorStats {
        CoordinatorStats {
            is_running,
            total_transactions_routed: self.total_transactions_routed.load(Ordering::Relaxed),
            cross_shard_messages_routed: self.cross_shard_messages_routed.load(Ordering::Relaxed),
            cross_shard_messages_failed: self.cross_shard_messages_failed.load(Ordering::Relaxed),
            shard_tps: self.last_shard_tps.lock().clone(),
            router_latency_p50_ms: 0.0,
            router_queue_depth: 0,
        }
    }

    /// Routing success summary derived from the counters.
    #[must_use]
    pub fn failure_stats(&self) -> FailureStats {
        FailureStats::from_counters(
            self.cross_shard_messages_routed.load(Ordering::SeqCst),
            self.cross_shard_messages_failed.load(Ordering::SeqCst),
        )
    }
}
