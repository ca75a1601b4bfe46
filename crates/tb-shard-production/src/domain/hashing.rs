//! Synthetic hashing for shard blocks.
//!
//! SHA-256 with per-purpose domain separation. These hashes stand in for
//! the execution engine's real roots; what matters here is that they are
//! deterministic, distinct per purpose, and chain correctly.

use sha2::{Digest, Sha256};
use shared_types::{Address, Hash, ShardId};

/// Hash of a produced block: H(shard_id, block_number, timestamp).
#[must_use]
pub fn block_hash(shard_id: ShardId, block_number: u64, timestamp_ms: u64) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(b"tburn-block");
    hasher.update(shard_id.to_le_bytes());
    hasher.update(block_number.to_le_bytes());
    hasher.update(timestamp_ms.to_le_bytes());
    hasher.finalize().into()
}

/// Synthetic state root placeholder: H(shard_id, block_number).
#[must_use]
pub fn state_root(shard_id: ShardId, block_number: u64) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(b"tburn-state");
    hasher.update(shard_id.to_le_bytes());
    hasher.update(block_number.to_le_bytes());
    hasher.finalize().into()
}

/// Hash seeding a shard's chain before its first produced block.
#[must_use]
pub fn genesis_hash(shard_id: ShardId) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(b"tburn-genesis");
    hasher.update(shard_id.to_le_bytes());
    hasher.finalize().into()
}

/// Deterministic validator address for a committee slot.
#[must_use]
pub fn validator_address(shard_id: ShardId, index: usize) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(b"tburn-validator");
    hasher.update(shard_id.to_le_bytes());
    hasher.update((index as u64).to_le_bytes());
    let digest = hasher.finalize();
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[..20]);
    address
}
