//! # Chain Events
//!
//! Defines all event types that flow through the shared bus. The payloads
//! live in `shared-types`; this module only shapes them into the tagged
//! union and provides topic-based filtering.

use serde::{Deserialize, Serialize};
use shared_types::entities::{CoordinatorStats, ParallelProducerStats, ShardBlock, ShardBlockData};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChainEvent {
    // =========================================================================
    // SHARD PRODUCTION
    // =========================================================================
    /// A shard's production loop emitted a new block.
    ///
    /// Consumed by the coordinator to derive cross-shard routing work.
    ShardBlockProduced(ShardBlock),

    /// The parallel producer started all shard loops.
    ProducerStarted {
        /// Number of shard loops scheduled.
        shard_count: u16,
    },

    /// The parallel producer stopped gracefully.
    ProducerStopped,

    /// The parallel producer was torn down under memory pressure.
    ProducerEmergencyStopped,

    /// Periodic aggregate throughput snapshot from the producer.
    StatsCollected(ParallelProducerStats),

    // =========================================================================
    // CROSS-SHARD COORDINATION
    // =========================================================================
    /// The legacy synchronous path processed a block.
    BlockProcessed(ShardBlockData),

    /// The coordinator finished handling a producer-emitted block.
    ShardBlockProcessed(ShardBlock),

    /// Periodic coordinator metrics snapshot.
    CoordinatorMetrics(CoordinatorStats),
}

impl ChainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ShardBlockProduced(_)
            | Self::ProducerStarted { .. }
            | Self::ProducerStopped
            | Self::ProducerEmergencyStopped
            | Self::StatsCollected(_) => EventTopic::ShardProduction,
            Self::BlockProcessed(_)
            | Self::ShardBlockProcessed(_)
            | Self::CoordinatorMetrics(_) => EventTopic::Coordination,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Producer lifecycle, block, and stats events.
    ShardProduction,
    /// Coordinator routing and metrics events.
    Coordination,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ChainEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> ShardBlock {
        ShardBlock {
            shard_id: 0,
            block_number: 1,
            hash: [0u8; 32],
            parent_hash: [0u8; 32],
            state_root: [0u8; 32],
            timestamp: 0,
            proposer: [0u8; 20],
            transaction_count: 0,
            cross_shard_tx_count: 0,
            gas_used: 0,
            gas_limit: 30_000_000,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        let event = ChainEvent::ShardBlockProduced(sample_block());
        assert_eq!(event.topic(), EventTopic::ShardProduction);

        let event = ChainEvent::ShardBlockProcessed(sample_block());
        assert_eq!(event.topic(), EventTopic::Coordination);
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&ChainEvent::ProducerStopped));
        assert!(filter.matches(&ChainEvent::ShardBlockProduced(sample_block())));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::ShardProduction]);

        assert!(filter.matches(&ChainEvent::ShardBlockProduced(sample_block())));
        assert!(!filter.matches(&ChainEvent::ShardBlockProcessed(sample_block())));
    }

    #[test]
    fn test_filter_all_topic_wildcard() {
        let filter = EventFilter::topics(vec![EventTopic::All]);
        assert!(filter.matches(&ChainEvent::ProducerEmergencyStopped));
        assert!(filter.matches(&ChainEvent::ShardBlockProcessed(sample_block())));
    }

    #[test]
    fn test_event_serializes_for_external_consumers() {
        let json = serde_json::to_string(&ChainEvent::ProducerStarted { shard_count: 24 })
            .expect("event must serialize");
        assert!(json.contains("ProducerStarted"));
        assert!(json.contains("24"));

        let back: ChainEvent = serde_json::from_str(&json).expect("event must deserialize");
        assert!(matches!(
            back,
            ChainEvent::ProducerStarted { shard_count: 24 }
        ));
    }

    #[test]
    fn test_lifecycle_events_are_production_topic() {
        for event in [
            ChainEvent::ProducerStarted { shard_count: 4 },
            ChainEvent::ProducerStopped,
            ChainEvent::ProducerEmergencyStopped,
        ] {
            assert_eq!(event.topic(), EventTopic::ShardProduction);
        }
    }
}
