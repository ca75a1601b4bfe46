//! Cross-crate integration scenarios.

pub mod coordination;
pub mod production;
