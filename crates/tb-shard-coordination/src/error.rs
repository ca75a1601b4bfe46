//! Coordination error types.

use thiserror::Error;

/// Errors surfaced by the coordination layer.
///
/// Lifecycle misuse (double start, stop when stopped) is deliberately NOT
/// represented here: those are benign no-ops with a diagnostic log.
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// A dependent service failed to initialize during `start()`.
    #[error("startup failed: {0}")]
    Startup(String),

    /// The cross-shard router rejected or timed out a send.
    #[error("router send failed: {0}")]
    RouterSend(String),

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
