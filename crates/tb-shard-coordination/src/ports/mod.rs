//! Hexagonal architecture ports (outbound dependencies).

pub mod outbound;

pub use outbound::*;
