//! Producer integration: timing behavior, hash chaining, and lifecycle
//! guarantees observed through the shared bus.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use shared_bus::{ChainEvent, EventFilter, EventTopic, InMemoryEventBus};
    use shared_types::clock::{Clock, SystemClock};
    use shared_types::{ShardBlock, ShardId};
    use tb_shard_production::{
        ParallelShardProducer, ProducerConfig, MAX_WINDOW_ENTRIES,
    };
    use tokio::time::timeout;

    fn producer_on(
        bus: &Arc<InMemoryEventBus>,
        config: ProducerConfig,
    ) -> ParallelShardProducer {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        ParallelShardProducer::new(config, Arc::clone(bus), clock)
    }

    /// Drain block events from a subscription until `deadline` elapses.
    async fn collect_blocks(
        subscription: &mut shared_bus::Subscription,
        duration: Duration,
    ) -> Vec<ShardBlock> {
        let mut blocks = Vec::new();
        let deadline = tokio::time::Instant::now() + duration;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, subscription.recv()).await {
                Ok(Some(ChainEvent::ShardBlockProduced(block))) => blocks.push(block),
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            }
        }
        blocks
    }

    // 24 shards at a 100ms cadence for one second: roughly ten blocks per
    // shard, with slack for jitter and scheduler load.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_24_shards_at_100ms_produce_about_10_blocks_each() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(8_192));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 24,
                block_interval_ms: 100,
                rng_seed: Some(42),
                ..ProducerConfig::default()
            },
        );

        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));
        producer.start().await;
        let blocks = collect_blocks(&mut subscription, Duration::from_millis(1_050)).await;
        producer.stop().await;

        let mut per_shard: HashMap<ShardId, usize> = HashMap::new();
        for block in &blocks {
            *per_shard.entry(block.shard_id).or_default() += 1;
        }

        assert_eq!(per_shard.len(), 24, "every shard should have produced");
        for (shard, count) in &per_shard {
            assert!(
                (7..=12).contains(count),
                "shard {shard} produced {count} blocks in ~1s at 100ms cadence"
            );
        }
        let total: usize = per_shard.values().sum();
        assert!(
            (190..=290).contains(&total),
            "aggregate {total} far from the expected ~240"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocks_chain_and_numbers_increase_per_shard() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(4_096));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 4,
                block_interval_ms: 20,
                rng_seed: Some(7),
                ..ProducerConfig::default()
            },
        );

        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));
        producer.start().await;
        let blocks = collect_blocks(&mut subscription, Duration::from_millis(400)).await;
        producer.stop().await;

        let mut last: HashMap<ShardId, ShardBlock> = HashMap::new();
        for block in blocks {
            if let Some(prev) = last.get(&block.shard_id) {
                assert_eq!(
                    block.block_number,
                    prev.block_number + 1,
                    "shard {} skipped a height",
                    block.shard_id
                );
                assert_eq!(
                    block.parent_hash, prev.hash,
                    "shard {} broke its hash chain",
                    block.shard_id
                );
            }
            last.insert(block.shard_id, block);
        }
        assert_eq!(last.len(), 4);
    }

    // Sustained production much denser than the window duration never lets
    // a window exceed its entry cap.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tps_window_stays_bounded_under_dense_load() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(16_384));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 2,
                block_interval_ms: 5,
                rng_seed: Some(13),
                ..ProducerConfig::default()
            },
        );

        producer.start().await;
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            for shard in 0..2 {
                let snap = producer.get_shard_state(shard).expect("shard state");
                assert!(
                    snap.tps_window_len <= MAX_WINDOW_ENTRIES,
                    "shard {shard} window grew to {}",
                    snap.tps_window_len
                );
            }
        }
        producer.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_continues_the_chain() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(4_096));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 3,
                block_interval_ms: 20,
                rng_seed: Some(3),
                ..ProducerConfig::default()
            },
        );

        producer.start().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        producer.stop().await;

        let heights_before: Vec<u64> = (0..3)
            .map(|s| producer.get_shard_state(s).unwrap().block_number)
            .collect();
        assert!(heights_before.iter().all(|&h| h > 0));

        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));
        producer.start().await;
        let blocks = collect_blocks(&mut subscription, Duration::from_millis(150)).await;
        producer.stop().await;

        for block in blocks {
            assert!(
                block.block_number > heights_before[usize::from(block.shard_id)],
                "shard {} restarted below its prior height",
                block.shard_id
            );
        }
    }

    // After emergency_stop, the bus stays silent for at least two full
    // production intervals.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_emergency_stop_silences_production() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(4_096));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 4,
                block_interval_ms: 50,
                rng_seed: Some(21),
                ..ProducerConfig::default()
            },
        );

        producer.start().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        producer.emergency_stop();
        assert!(!producer.is_running());

        // Let any in-flight publish drain before observing.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));
        let blocks = collect_blocks(&mut subscription, Duration::from_millis(120)).await;
        assert!(
            blocks.is_empty(),
            "{} blocks produced after emergency stop",
            blocks.len()
        );
    }

    #[tokio::test]
    async fn test_stats_event_aggregates_all_shards() {
        let bus = Arc::new(InMemoryEventBus::with_capacity(4_096));
        let producer = producer_on(
            &bus,
            ProducerConfig {
                shard_count: 4,
                block_interval_ms: 20,
                stats_interval_ms: 100,
                rng_seed: Some(9),
                ..ProducerConfig::default()
            },
        );

        let mut subscription =
            bus.subscribe(EventFilter::topics(vec![EventTopic::ShardProduction]));
        producer.start().await;

        let stats = loop {
            match timeout(Duration::from_secs(2), subscription.recv()).await {
                Ok(Some(ChainEvent::StatsCollected(stats))) => break stats,
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => panic!("no stats event within 2s"),
            }
        };
        producer.stop().await;

        assert!(stats.is_running);
        assert_eq!(stats.shard_count, 4);
        assert_eq!(stats.shards.len(), 4);
        assert_eq!(
            stats.total_blocks_produced,
            stats.shards.iter().map(|s| s.blocks_produced).sum::<u64>()
        );
        assert!(stats.peak_tps >= stats.current_tps || stats.current_tps == 0);
    }
}
