//! Outbound ports: the external services the coordinator drives.

use crate::error::CoordinationError;
use async_trait::async_trait;
use shared_types::{MessagePriority, ShardId};

/// Shard orchestrator lifecycle - outbound port.
///
/// The coordinator only drives startup; no return value beyond success is
/// consumed.
#[async_trait]
pub trait ShardOrchestrator: Send + Sync {
    /// Bring the orchestrator online. Failure aborts coordinator startup.
    async fn start(&self) -> Result<(), CoordinationError>;
}

/// Delivery options attached to every routed message.
#[derive(Clone, Debug)]
pub struct MessageOptions {
    /// Unique message nonce (UUID v4).
    pub nonce: String,
    /// Time-to-live in milliseconds; the router drops expired messages.
    pub ttl_ms: u64,
    /// Free-form routing metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Router-side operational stats.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouterStats {
    /// Median delivery latency in milliseconds.
    pub latency_p50_ms: f64,
    /// Messages currently queued for delivery.
    pub current_queue_depth: usize,
}

/// Cross-shard message router - outbound port.
#[async_trait]
pub trait CrossShardRouter: Send + Sync {
    /// Hand one message to the router. At-most-once: the caller counts a
    /// failure and moves on, it never retries.
    async fn send_message(
        &self,
        source_shard: ShardId,
        target_shard: ShardId,
        payload: Vec<u8>,
        priority: MessagePriority,
        options: MessageOptions,
    ) -> Result<(), CoordinationError>;

    /// Router-side operational stats.
    fn get_stats(&self) -> RouterStats;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock orchestrator for testing.
#[derive(Default)]
pub struct MockShardOrchestrator {
    /// Should `start` fail?
    pub should_fail: bool,
    /// Milliseconds `start` sleeps before returning, to hold a caller
    /// mid-startup.
    pub start_delay_ms: u64,
    /// Number of `start` calls observed.
    pub start_calls: std::sync::atomic::AtomicU64,
}

#[async_trait]
impl ShardOrchestrator for MockShardOrchestrator {
    async fn start(&self) -> Result<(), CoordinationError> {
        self.start_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.start_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.start_delay_ms)).await;
        }
        if self.should_fail {
            return Err(CoordinationError::Startup("mock orchestrator down".into()));
        }
        Ok(())
    }
}

/// Mock router for testing. Records every send and can be configured to
/// reject all of them.
#[derive(Default)]
pub struct MockCrossShardRouter {
    /// Should every `send_message` fail?
    pub should_fail: bool,
    /// Number of `send_message` calls observed.
    pub send_calls: std::sync::atomic::AtomicU64,
    /// `(source, target, priority)` of each send, in call order.
    pub sent: parking_lot::Mutex<Vec<(ShardId, ShardId, MessagePriority)>>,
}

impl MockCrossShardRouter {
    /// A router that rejects every message.
    #[must_use]
    pub fn always_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CrossShardRouter for MockCrossShardRouter {
    async fn send_message(
        &self,
        source_shard: ShardId,
        target_shard: ShardId,
        _payload: Vec<u8>,
        priority: MessagePriority,
        _options: MessageOptions,
    ) -> Result<(), CoordinationError> {
        self.send_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.should_fail {
            return Err(CoordinationError::RouterSend("mock rejection".into()));
        }
        self.sent.lock().push((source_shard, target_shard, priority));
        Ok(())
    }

    fn get_stats(&self) -> RouterStats {
        RouterStats {
            latency_p50_ms: 1.0,
            current_queue_depth: 0,
        }
    }
}
