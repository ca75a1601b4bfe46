//! # Domain Layer
//!
//! Pure production-state logic: per-shard mutable runtime records with
//! bounded TPS windows, deterministic validator committees, and synthetic
//! hashing. No scheduling or I/O lives here.

pub mod hashing;
pub mod shard_state;

pub use hashing::{block_hash, genesis_hash, state_root, validator_address};
pub use shard_state::{deterministic_committee, ShardState, TpsSample};
