//! Randomized routing decisions.
//!
//! Both the event-driven path and the legacy inline path go through these
//! functions, so the two produce statistically identical cross-shard
//! ratios and priority distributions.

use rand::Rng;
use shared_types::{MessagePriority, ShardId, ShardTransaction};

/// Pick a destination shard by exclusion sampling: draw uniformly over
/// `[0, shard_count)` and resample while the draw equals `source`.
///
/// Invariant: the result never equals `source` when more than one shard
/// exists. With a single shard the only possible value is returned.
pub fn select_target_shard<R: Rng>(rng: &mut R, source: ShardId, shard_count: u16) -> ShardId {
    if shard_count <= 1 {
        return source;
    }
    loop {
        let candidate = rng.gen_range(0..shard_count);
        if candidate != source {
            return candidate;
        }
    }
}

/// Assign a delivery priority from a single uniform draw against cumulative
/// thresholds: 1% critical, 9% high, 70% normal, 20% low.
pub fn assign_priority<R: Rng>(rng: &mut R) -> MessagePriority {
    let draw: f64 = rng.gen();
    if draw < 0.01 {
        MessagePriority::Critical
    } else if draw < 0.10 {
        MessagePriority::High
    } else if draw < 0.80 {
        MessagePriority::Normal
    } else {
        MessagePriority::Low
    }
}

/// Synthesize one cross-shard transaction originating at `source`.
pub fn synthesize_cross_shard_tx<R: Rng>(
    rng: &mut R,
    source: ShardId,
    shard_count: u16,
    now_millis: u64,
) -> ShardTransaction {
    let target_shard = select_target_shard(rng, source, shard_count);
    ShardTransaction {
        id: uuid::Uuid::new_v4().to_string(),
        source_shard: source,
        target_shard,
        is_cross_shard: true,
        priority: assign_priority(rng),
        timestamp: now_millis,
        payload: Vec::new(),
    }
}
