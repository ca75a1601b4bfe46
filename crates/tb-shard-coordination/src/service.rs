//! Shard coordinator service.
//!
//! Owns the startup/shutdown ordering of the production-side services and
//! bridges produced blocks into cross-shard routing work. The coordinator
//! never shares mutable state with the producer: it reads bus events and
//! keeps its own counters.

use crate::config::CoordinatorConfig;
use crate::domain::sampling;
use crate::error::CoordinationError;
use crate::metrics::CoordinatorMetrics;
use crate::ports::{CrossShardRouter, MessageOptions, ShardOrchestrator};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use shared_bus::{ChainEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus};
use shared_types::clock::Clock;
use shared_types::{CoordinatorStats, FailureStats, ShardBlockData, ShardTransaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tb_shard_production::ParallelShardProducer;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Coordinates shard production with cross-shard routing.
///
/// Startup order: orchestrator, router (injected pre-built), producer
/// listener, producer. Shutdown reverses it. Routing is fire-and-forget
/// with at-most-once delivery.
pub struct ShardCoordinator {
    config: CoordinatorConfig,
    bus: Arc<InMemoryEventBus>,
    clock: Arc<dyn Clock>,
    orchestrator: Arc<dyn ShardOrchestrator>,
    router: Arc<dyn CrossShardRouter>,
    producer: Option<Arc<ParallelShardProducer>>,
    metrics: Arc<CoordinatorMetrics>,
    listener_handle: Mutex<Option<JoinHandle<()>>>,
    metrics_handle: Mutex<Option<JoinHandle<()>>>,
    is_running: AtomicBool,
    /// RNG for the inline `process_block` path. The event listener owns a
    /// separate RNG derived from the same seed.
    rng: Mutex<SmallRng>,
}

impl ShardCoordinator {
    /// Wire a coordinator from its collaborators.
    ///
    /// `producer` is required when `parallel_production_enabled` is set.
    pub fn new(
        config: CoordinatorConfig,
        bus: Arc<InMemoryEventBus>,
        clock: Arc<dyn Clock>,
        orchestrator: Arc<dyn ShardOrchestrator>,
        router: Arc<dyn CrossShardRouter>,
        producer: Option<Arc<ParallelShardProducer>>,
    ) -> Result<Self, CoordinationError> {
        config.validate()?;
        if config.parallel_production_enabled && producer.is_none() {
            return Err(CoordinationError::InvalidConfig(
                "parallel production enabled but no producer supplied".into(),
            ));
        }

        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let metrics = Arc::new(CoordinatorMetrics::new(config.shard_count));

        Ok(Self {
            config,
            bus,
            clock,
            orchestrator,
            router,
            producer,
            metrics,
            listener_handle: Mutex::new(None),
            metrics_handle: Mutex::new(None),
            is_running: AtomicBool::new(false),
            rng: Mutex::new(rng),
        })
    }

    /// Whether the coordinator is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Start dependent services in order, then mark running.
    ///
    /// Startup failures propagate and leave the coordinator stopped. A
    /// start while already running is a logged no-op.
    pub async fn start(&self) -> Result<(), CoordinationError> {
        // swap claims the running flag atomically so two racing starts
        // cannot both pass the check and double-spawn the tasks.
        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!("[tb-coord] Already running, start ignored");
            return Ok(());
        }

        info!("[tb-coord] Starting shard coordinator");
        if let Err(err) = self.orchestrator.start().await {
            self.is_running.store(false, Ordering::SeqCst);
            return Err(err);
        }

        if self.config.parallel_production_enabled {
            if let Some(producer) = &self.producer {
                // Drop any stale listener first so a restart cycle can
                // never leave two subscriptions handling the same blocks.
                if let Some(stale) = self.listener_handle.lock().take() {
                    stale.abort();
                    warn!("[tb-coord] Replaced a stale block listener");
                }
                *self.listener_handle.lock() = Some(self.spawn_block_listener());
                producer.start().await;
            }
        }

        *self.metrics_handle.lock() = Some(self.spawn_metrics_loop());
        info!(
            "[tb-coord] ✅ Coordinator running ({} shards)",
            self.config.shard_count
        );
        Ok(())
    }

    /// Stop in reverse order: metrics loop, listener, producer, counters.
    ///
    /// Every step tolerates the corresponding service already being
    /// absent. Idempotent.
    pub async fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            debug!("[tb-coord] Already stopped, stop ignored");
            return;
        }

        // Take each handle out under the lock, then drop the guard before
        // awaiting; holding it across the await would block emergency_stop
        // and make this future !Send.
        let metrics_task = self.metrics_handle.lock().take();
        if let Some(handle) = metrics_task {
            handle.abort();
            let _ = handle.await;
        }
        let listener_task = self.listener_handle.lock().take();
        if let Some(handle) = listener_task {
            handle.abort();
            let _ = handle.await;
        }
        if let Some(producer) = &self.producer {
            producer.stop().await;
        }
        self.metrics.reset();
        info!("[tb-coord] Stopped shard coordinator");
    }

    /// Synchronous best-effort teardown. Messages in flight are neither
    /// delivered nor counted as failed. Safe to call at any time.
    pub fn emergency_stop(&self) {
        let was_running = self.is_running.swap(false, Ordering::SeqCst);

        if let Some(handle) = self.metrics_handle.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.listener_handle.lock().take() {
            handle.abort();
        }
        if let Some(producer) = &self.producer {
            producer.emergency_stop();
        }
        self.metrics.reset();

        if was_running {
            warn!("[tb-coord] 🚨 Emergency stop: coordinator torn down");
        }
    }

    /// Current combined stats: counters merged with router-side numbers.
    #[must_use]
    pub fn get_stats(&self) -> CoordinatorStats {
        let router = self.router.get_stats();
        let mut stats = self.metrics.snapshot(self.is_running());
        stats.router_latency_p50_ms = router.latency_p50_ms;
        stats.router_queue_depth = router.current_queue_depth as u64;
        stats
    }

    /// Routing success/failure summary.
    #[must_use]
    pub fn get_failure_stats(&self) -> FailureStats {
        self.metrics.failure_stats()
    }

    /// Routing-failure diagnostics emitted so far (rate-limited logging).
    #[must_use]
    pub fn failure_logs_emitted(&self) -> u64 {
        self.metrics
            .failure_logs_emitted
            .load(Ordering::SeqCst)
    }

    /// Route one cross-shard transaction. On failure the message is
    /// counted and, every `failure_log_interval` failures, logged; it is
    /// never retried.
    pub async fn route_cross_shard_message(&self, tx: ShardTransaction) {
        route_message(
            self.router.as_ref(),
            &self.metrics,
            &self.config,
            tx,
        )
        .await;
    }

    /// Legacy inline path: synthesize and route this block's cross-shard
    /// transactions immediately and return the block data, bypassing the
    /// event-driven listener. Uses the same sampling rules as the listener.
    pub async fn process_block(
        &self,
        block_number: u64,
        tx_count: u32,
        shard_id: u16,
    ) -> ShardBlockData {
        let cross_count =
            (f64::from(tx_count) * self.config.cross_shard_ratio).floor() as u32;
        let now = self.clock.now_millis();

        let transactions: Vec<ShardTransaction> = {
            let mut rng = self.rng.lock();
            (0..cross_count)
                .map(|_| {
                    sampling::synthesize_cross_shard_tx(
                        &mut *rng,
                        shard_id,
                        self.config.shard_count,
                        now,
                    )
                })
                .collect()
        };

        self.metrics
            .record_block(shard_id, u64::from(tx_count), u64::from(cross_count));

        let data = ShardBlockData {
            block_number,
            shard_id,
            transaction_count: tx_count,
            cross_shard_transactions: transactions.clone(),
        };

        self.spawn_routing(transactions);
        self.bus
            .publish(ChainEvent::BlockProcessed(data.clone()))
            .await;
        data
    }

    /// Fire-and-forget: one task routes this batch so the inline path
    /// never waits on the router.
    fn spawn_routing(&self, transactions: Vec<ShardTransaction>) {
        if transactions.is_empty() {
            return;
        }
        let router = Arc::clone(&self.router);
        let metrics = Arc::clone(&self.metrics);
        let config = self.config.clone();
        tokio::spawn(async move {
            for tx in transactions {
                route_message(router.as_ref(), &metrics, &config, tx).await;
            }
        });
    }

    fn spawn_block_listener(&self) -> JoinHandle<()> {
        let bus = Arc::clone(&self.bus);
        let clock = Arc::clone(&self.clock);
        let router = Arc::clone(&self.router);
        let metrics = Arc::clone(&self.metrics);
        let config = self.config.clone();
        let seed = config.rng_seed;

        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));

        tokio::spawn(async move {
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
                None => SmallRng::from_entropy(),
            };

            while let Some(event) = subscription.recv().await {
                let ChainEvent::ShardBlockProduced(block) = event else {
                    continue;
                };

                metrics.record_block(
                    block.shard_id,
                    u64::from(block.transaction_count),
                    u64::from(block.cross_shard_tx_count),
                );

                let now = clock.now_millis();
                let transactions: Vec<ShardTransaction> = (0..block.cross_shard_tx_count)
                    .map(|_| {
                        sampling::synthesize_cross_shard_tx(
                            &mut rng,
                            block.shard_id,
                            config.shard_count,
                            now,
                        )
                    })
                    .collect();

                if !transactions.is_empty() {
                    let router = Arc::clone(&router);
                    let metrics = Arc::clone(&metrics);
                    let config = config.clone();
                    tokio::spawn(async move {
                        for tx in transactions {
                            route_message(router.as_ref(), &metrics, &config, tx).await;
                        }
                    });
                }

                bus.publish(ChainEvent::ShardBlockProcessed(block)).await;
            }
        })
    }

    fn spawn_metrics_loop(&self) -> JoinHandle<()> {
        let bus = Arc::clone(&self.bus);
        let metrics = Arc::clone(&self.metrics);
        let router = Arc::clone(&self.router);
        let interval_ms = self.config.metrics_interval_ms;
        let shard_count = self.config.shard_count;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let shard_tps = metrics.roll_interval(interval_ms);
                let router_stats = router.get_stats();
                debug!(
                    "[tb-coord] Metrics: {} shards, peak shard TPS {}, router queue {}",
                    shard_count,
                    shard_tps.iter().max().copied().unwrap_or(0),
                    router_stats.current_queue_depth
                );
                let mut stats = metrics.snapshot(true);
                stats.router_latency_p50_ms = router_stats.latency_p50_ms;
                stats.router_queue_depth = router_stats.current_queue_depth as u64;
                bus.publish(ChainEvent::CoordinatorMetrics(stats)).await;
            }
        })
    }
}

/// Shared routing primitive for both the event-driven and inline paths.
async fn route_message(
    router: &dyn CrossShardRouter,
    metrics: &CoordinatorMetrics,
    config: &CoordinatorConfig,
    tx: ShardTransaction,
) {
    let options = MessageOptions {
        nonce: tx.id.clone(),
        ttl_ms: config.message_ttl_ms,
        metadata: Some(serde_json::json!({
            "timestamp": tx.timestamp,
            "is_cross_shard": tx.is_cross_shard,
        })),
    };

    let result = router
        .send_message(
            tx.source_shard,
            tx.target_shard,
            tx.payload,
            tx.priority,
            options,
        )
        .await;

    if let Err(err) = result {
        let failed_total = metrics.record_failure();
        if failed_total % config.failure_log_interval == 0 {
            metrics
                .failure_logs_emitted
                .fetch_add(1, Ordering::SeqCst);
            warn!(
                "[tb-coord] Cross-shard routing failing ({} failures so far): {}",
                failed_total, err
            );
        }
    }
}
