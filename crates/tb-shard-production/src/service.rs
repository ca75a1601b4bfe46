//! Parallel shard producer service.
//!
//! Owns the per-shard states and drives one production task per shard plus
//! a lower-frequency global stats task. All lifecycle operations are
//! benign on misuse: double start and double stop are no-ops with a
//! diagnostic, never errors.

use crate::config::ProducerConfig;
use crate::domain::shard_state::ShardState;
use crate::{
    CLEANUP_RETAINED_ENTRIES, DEFAULT_GAS_LIMIT, GAS_PER_TX, MAX_JITTER_MS, TPS_HISTORY_MAX,
};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use shared_bus::{ChainEvent, EventPublisher, InMemoryEventBus};
use shared_types::clock::Clock;
use shared_types::{ParallelProducerStats, ShardBlock, ShardId, ShardProductionSnapshot};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drives independent block production loops for N shards.
///
/// The shard state array is created once at construction and lives for the
/// process lifetime; production tasks only exist between `start` and
/// `stop`/`emergency_stop`.
pub struct ParallelShardProducer {
    /// Production parameters, resolved once at construction.
    config: ProducerConfig,

    /// Event bus for block and stats fan-out.
    bus: Arc<InMemoryEventBus>,

    /// Injected time source.
    clock: Arc<dyn Clock>,

    /// Per-shard state, index-addressed by shard id.
    shards: Arc<Vec<Mutex<ShardState>>>,

    /// Handles of the running per-shard production tasks.
    shard_handles: Mutex<Vec<JoinHandle<()>>>,

    /// Handle of the global stats collection task.
    stats_handle: Mutex<Option<JoinHandle<()>>>,

    /// Whether production loops are scheduled.
    is_running: AtomicBool,

    /// Highest global TPS observed since construction.
    peak_tps: Arc<AtomicU64>,

    /// Bounded global TPS history, oldest evicted first.
    tps_history: Arc<Mutex<VecDeque<u64>>>,
}

impl ParallelShardProducer {
    /// Create a producer with its full shard state array.
    #[must_use]
    pub fn new(config: ProducerConfig, bus: Arc<InMemoryEventBus>, clock: Arc<dyn Clock>) -> Self {
        info!("[tb-prod] Initializing parallel shard producer");
        info!("  Shards: {}", config.shard_count);
        info!("  Block interval: {}ms", config.block_interval_ms);
        info!("  Target TPS/shard: {}", config.target_tps_per_shard);

        let shards = (0..config.shard_count)
            .map(|shard_id| {
                Mutex::new(ShardState::new(
                    shard_id,
                    config.genesis_block_offset,
                    config.validators_per_shard,
                ))
            })
            .collect();

        Self {
            config,
            bus,
            clock,
            shards: Arc::new(shards),
            shard_handles: Mutex::new(Vec::new()),
            stats_handle: Mutex::new(None),
            is_running: AtomicBool::new(false),
            peak_tps: Arc::new(AtomicU64::new(0)),
            tps_history: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Whether production loops are currently scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// The producer's configuration.
    #[must_use]
    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    /// Start one production task per shard plus the stats task.
    ///
    /// Idempotent: a second start while running is a logged no-op.
    pub async fn start(&self) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!("[tb-prod] Already running, start ignored");
            return;
        }

        let mut seed_rng = match self.config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        {
            let mut handles = self.shard_handles.lock();
            for shard_id in 0..self.config.shard_count {
                // The jitter offsets each loop's first tick so the shard
                // loops do not all fire in the same scheduler tick; the
                // recurring cadence stays at the base interval.
                let jitter = seed_rng.gen_range(0..=MAX_JITTER_MS);
                let task_seed = seed_rng.gen::<u64>();
                handles.push(self.spawn_shard_loop(shard_id, jitter, task_seed));
            }
        }

        *self.stats_handle.lock() = Some(self.spawn_stats_loop());

        info!(
            "[tb-prod] ✅ Started block production for {} shards ({}ms interval)",
            self.config.shard_count, self.config.block_interval_ms
        );

        self.bus
            .publish(ChainEvent::ProducerStarted {
                shard_count: self.config.shard_count,
            })
            .await;
    }

    /// Stop production gracefully.
    ///
    /// Guarantees that no further production tick fires after this returns:
    /// every task handle is aborted and awaited. TPS windows are cleared to
    /// free memory, but block heights and the hash chain are preserved so a
    /// later `start` continues rather than restarting genesis. Idempotent.
    pub async fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            debug!("[tb-prod] Already stopped, stop ignored");
            return;
        }

        let handles = {
            let mut guard = self.shard_handles.lock();
            std::mem::take(&mut *guard)
        };
        for handle in handles {
            handle.abort();
            let _ = handle.await;
        }

        let stats = self.stats_handle.lock().take();
        if let Some(handle) = stats {
            handle.abort();
            let _ = handle.await;
        }

        for shard in self.shards.iter() {
            shard.lock().clear_window();
        }

        info!("[tb-prod] Stopped block production");
        self.bus.publish(ChainEvent::ProducerStopped).await;
    }

    /// Synchronous best-effort teardown under memory pressure.
    ///
    /// Aborts every task without awaiting, zeroes `current_tps`, and drops
    /// the windows. Leaves the producer in the same externally-observable
    /// stopped state as `stop`. Never fails.
    pub fn emergency_stop(&self) {
        let was_running = self.is_running.swap(false, Ordering::SeqCst);

        let handles = {
            let mut guard = self.shard_handles.lock();
            std::mem::take(&mut *guard)
        };
        for handle in &handles {
            handle.abort();
        }
        if let Some(handle) = self.stats_handle.lock().take() {
            handle.abort();
        }

        for shard in self.shards.iter() {
            let mut state = shard.lock();
            state.current_tps = 0;
            state.clear_window();
        }

        if was_running {
            warn!("[tb-prod] 🚨 Emergency stop: all shard timers cleared");
        }

        // Best-effort notification; skipped when no runtime is available.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let bus = Arc::clone(&self.bus);
            runtime.spawn(async move {
                bus.publish(ChainEvent::ProducerEmergencyStopped).await;
            });
        }
    }

    /// Trim bounded history to a smaller retained size without stopping
    /// production. A lighter pressure valve than `emergency_stop`.
    pub fn force_memory_cleanup(&self) {
        for shard in self.shards.iter() {
            shard.lock().trim_window(CLEANUP_RETAINED_ENTRIES);
        }
        {
            let mut history = self.tps_history.lock();
            while history.len() > TPS_HISTORY_MAX / 2 {
                history.pop_front();
            }
            history.shrink_to_fit();
        }
        debug!(
            "[tb-prod] Memory cleanup: windows trimmed to {} entries",
            CLEANUP_RETAINED_ENTRIES
        );
    }

    /// Aggregate stats snapshot across all shards.
    #[must_use]
    pub fn get_stats(&self) -> ParallelProducerStats {
        let shards: Vec<ShardProductionSnapshot> =
            self.shards.iter().map(|s| s.lock().snapshot()).collect();

        ParallelProducerStats {
            is_running: self.is_running(),
            shard_count: self.config.shard_count,
            total_blocks_produced: shards.iter().map(|s| s.blocks_produced).sum(),
            total_tx_processed: shards.iter().map(|s| s.tx_processed).sum(),
            total_cross_shard_tx: shards.iter().map(|s| s.cross_shard_tx).sum(),
            current_tps: shards.iter().map(|s| s.current_tps).sum(),
            peak_tps: self.peak_tps.load(Ordering::Relaxed),
            shards,
        }
    }

    /// Read-only snapshot of one shard's state.
    #[must_use]
    pub fn get_shard_state(&self, shard_id: ShardId) -> Option<ShardProductionSnapshot> {
        self.shards
            .get(usize::from(shard_id))
            .map(|s| s.lock().snapshot())
    }

    fn spawn_shard_loop(&self, shard_id: ShardId, jitter_ms: u64, seed: u64) -> JoinHandle<()> {
        let shards = Arc::clone(&self.shards);
        let bus = Arc::clone(&self.bus);
        let clock = Arc::clone(&self.clock);
        let config = self.config.clone();

        tokio::spawn(async move {
            let mut rng = SmallRng::seed_from_u64(seed);
            tokio::time::sleep(Duration::from_millis(jitter_ms)).await;

            let mut ticker =
                tokio::time::interval(Duration::from_millis(config.block_interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; consume it so the loop
            // produces on the interval cadence from the jittered offset.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let block = produce_shard_block(
                    &shards[usize::from(shard_id)],
                    &config,
                    clock.as_ref(),
                    &mut rng,
                );
                debug!(
                    "[tb-prod] Shard {} block #{} ({} tx, hash {})",
                    shard_id,
                    block.block_number,
                    block.transaction_count,
                    hex::encode(&block.hash[..8])
                );
                bus.publish(ChainEvent::ShardBlockProduced(block)).await;
            }
        })
    }

    fn spawn_stats_loop(&self) -> JoinHandle<()> {
        let shards = Arc::clone(&self.shards);
        let bus = Arc::clone(&self.bus);
        let peak_tps = Arc::clone(&self.peak_tps);
        let tps_history = Arc::clone(&self.tps_history);
        let config = self.config.clone();

        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_millis(config.stats_interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let snapshots: Vec<ShardProductionSnapshot> =
                    shards.iter().map(|s| s.lock().snapshot()).collect();
                let global_tps: u64 = snapshots.iter().map(|s| s.current_tps).sum();

                peak_tps.fetch_max(global_tps, Ordering::Relaxed);
                {
                    let mut history = tps_history.lock();
                    history.push_back(global_tps);
                    while history.len() > TPS_HISTORY_MAX {
                        history.pop_front();
                    }
                }

                let stats = ParallelProducerStats {
                    is_running: true,
                    shard_count: config.shard_count,
                    total_blocks_produced: snapshots.iter().map(|s| s.blocks_produced).sum(),
                    total_tx_processed: snapshots.iter().map(|s| s.tx_processed).sum(),
                    total_cross_shard_tx: snapshots.iter().map(|s| s.cross_shard_tx).sum(),
                    current_tps: global_tps,
                    peak_tps: peak_tps.load(Ordering::Relaxed),
                    shards: snapshots,
                };

                bus.publish(ChainEvent::StatsCollected(stats)).await;
            }
        })
    }
}

/// Produce one block for one shard (executed per production tick).
fn produce_shard_block(
    shard: &Mutex<ShardState>,
    config: &ProducerConfig,
    clock: &dyn Clock,
    rng: &mut SmallRng,
) -> ShardBlock {
    let now = clock.now_millis();

    // Target transactions at this cadence, ±10% variance, clipped to the cap.
    let variance = rng.gen_range(0.9..1.1);
    let transaction_count =
        ((config.tx_per_block_target() * variance) as u32).min(config.max_tx_per_shard_block);
    let cross_shard_tx_count =
        (f64::from(transaction_count) * config.cross_shard_ratio).floor() as u32;

    let mut state = shard.lock();
    state.block_number += 1;
    let block_number = state.block_number;
    let shard_id = state.shard_id;

    let proposer = state.next_proposer();
    let parent_hash = state.last_block_hash;
    let hash = crate::domain::hashing::block_hash(shard_id, block_number, now);

    let block = ShardBlock {
        shard_id,
        block_number,
        hash,
        parent_hash,
        state_root: crate::domain::hashing::state_root(shard_id, block_number),
        timestamp: now,
        proposer,
        transaction_count,
        cross_shard_tx_count,
        gas_used: u64::from(transaction_count) * GAS_PER_TX,
        gas_limit: DEFAULT_GAS_LIMIT,
    };

    state.last_block_hash = hash;
    state.record_block(now, transaction_count, cross_shard_tx_count);

    block
}
