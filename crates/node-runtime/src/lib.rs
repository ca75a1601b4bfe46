//! # Node Runtime Library
//!
//! Exposes the runtime's wiring for the binary and for integration tests.
//!
//! - `config` - environment-driven node configuration
//! - `adapters` - in-process implementations of the coordination ports

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;

pub use adapters::{LocalShardOrchestrator, LoopbackRouter};
pub use config::NodeConfig;
