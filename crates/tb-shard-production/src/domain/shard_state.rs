//! Per-shard mutable runtime state.
//!
//! One `ShardState` per shard index, owned exclusively by the producer.
//! Counters are monotonic while running; the TPS window is bounded by both
//! a duration and a hard entry cap so sustained load can never grow memory.

use crate::domain::hashing;
use crate::{CURRENT_TPS_SPAN_MS, MAX_WINDOW_ENTRIES, TPS_WINDOW_MS};
use shared_types::{Address, Hash, ShardId, ShardProductionSnapshot};
use std::collections::VecDeque;

/// One sample of the per-shard TPS sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpsSample {
    /// Sample timestamp (ms since epoch).
    pub timestamp: u64,
    /// Transactions accounted to the block produced at `timestamp`.
    pub tx_count: u32,
}

/// Build the fixed validator committee for a shard.
///
/// This is the single construction seam for proposer eligibility: wiring a
/// real validator orchestrator into production means replacing this call
/// site, not touching the rotation logic.
#[must_use]
pub fn deterministic_committee(shard_id: ShardId, size: usize) -> Vec<Address> {
    (0..size)
        .map(|i| hashing::validator_address(shard_id, i))
        .collect()
}

/// Per-shard mutable production record.
#[derive(Debug)]
pub struct ShardState {
    /// Stable shard identity.
    pub shard_id: ShardId,
    /// Current block height; continues across stop/start cycles.
    pub block_number: u64,
    /// Hash-chain pointer: the next block's parent.
    pub last_block_hash: Hash,
    /// Blocks produced since the last lifecycle reset.
    pub blocks_produced: u64,
    /// Transactions accounted since the last lifecycle reset.
    pub tx_processed: u64,
    /// Cross-shard transactions accounted since the last lifecycle reset.
    pub cross_shard_tx: u64,
    /// Bounded TPS window, newest samples at the back.
    pub tps_window: VecDeque<TpsSample>,
    /// Derived: transactions over the last second, recomputed per tick.
    pub current_tps: u64,
    /// Fixed committee assigned at shard initialization.
    pub validators: Vec<Address>,
    /// Round-robin rotation index; advances unconditionally.
    pub validator_index: usize,
}

impl ShardState {
    /// Create the state for one shard, seeded at its genesis offset.
    #[must_use]
    pub fn new(shard_id: ShardId, genesis_block_offset: u64, committee_size: usize) -> Self {
        Self {
            shard_id,
            block_number: genesis_block_offset + u64::from(shard_id),
            last_block_hash: hashing::genesis_hash(shard_id),
            blocks_produced: 0,
            tx_processed: 0,
            cross_shard_tx: 0,
            tps_window: VecDeque::new(),
            current_tps: 0,
            validators: deterministic_committee(shard_id, committee_size),
            validator_index: 0,
        }
    }

    /// Select the proposer for the next block and advance the rotation.
    pub fn next_proposer(&mut self) -> Address {
        let proposer = self.validators[self.validator_index % self.validators.len()];
        self.validator_index = self.validator_index.wrapping_add(1);
        proposer
    }

    /// Account a produced block: bump counters, append a window sample,
    /// evict by age and by the hard cap, and recompute `current_tps`.
    pub fn record_block(&mut self, now: u64, tx_count: u32, cross_shard_count: u32) {
        self.blocks_produced += 1;
        self.tx_processed += u64::from(tx_count);
        self.cross_shard_tx += u64::from(cross_shard_count);

        self.tps_window.push_back(TpsSample {
            timestamp: now,
            tx_count,
        });

        // Evict by age first, then enforce the entry cap (whichever is
        // tighter wins).
        let cutoff = now.saturating_sub(TPS_WINDOW_MS);
        while self
            .tps_window
            .front()
            .is_some_and(|s| s.timestamp <= cutoff)
        {
            self.tps_window.pop_front();
        }
        while self.tps_window.len() > MAX_WINDOW_ENTRIES {
            self.tps_window.pop_front();
        }

        let tps_cutoff = now.saturating_sub(CURRENT_TPS_SPAN_MS);
        self.current_tps = self
            .tps_window
            .iter()
            .filter(|s| s.timestamp > tps_cutoff)
            .map(|s| u64::from(s.tx_count))
            .sum();
    }

    /// Drop the TPS window (graceful stop). Height and hash chain are
    /// preserved so a later start continues the chain.
    pub fn clear_window(&mut self) {
        self.tps_window.clear();
        self.tps_window.shrink_to_fit();
    }

    /// Trim the window to its most recent `retain` entries without
    /// touching anything else (memory-pressure valve).
    pub fn trim_window(&mut self, retain: usize) {
        while self.tps_window.len() > retain {
            self.tps_window.pop_front();
        }
        self.tps_window.shrink_to_fit();
    }

    /// Read-only snapshot for stats consumers.
    #[must_use]
    pub fn snapshot(&self) -> ShardProductionSnapshot {
        ShardProductionSnapshot {
            shard_id: self.shard_id,
            block_number: self.block_number,
            blocks_produced: self.blocks_produced,
            tx_processed: self.tx_processed,
            cross_shard_tx: self.cross_shard_tx,
            current_tps: self.current_tps,
            validator_count: self.validators.len(),
            tps_window_len: self.tps_window.len(),
        }
    }
}
