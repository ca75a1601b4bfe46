//! Pure coordination domain logic: target sampling, priority assignment,
//! and cross-shard transaction synthesis.

pub mod sampling;

pub use sampling::{assign_priority, select_target_shard, synthesize_cross_shard_tx};
