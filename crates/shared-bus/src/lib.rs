//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Typed fan-out channel between the shard block producer, the cross-shard
//! coordinator, and external consumers (REST adapters, dashboards).
//!
//! ## Pattern
//!
//! ```text
//! ┌───────────────────┐                    ┌────────────────────┐
//! │ Shard Producer    │                    │ Shard Coordinator  │
//! │                   │    publish()       │                    │
//! │                   │ ──────┐            │                    │
//! └───────────────────┘       │            └────────────────────┘
//!                             ▼                     ↑
//!                       ┌──────────────┐           │
//!                       │  Event Bus   │           │
//!                       │              │ ──────────┘
//!                       └──────────────┘  subscribe()
//! ```
//!
//! Events are a tagged union (`ChainEvent`) rather than dynamically-typed
//! name/payload pairs, so every subscriber matches on a closed set of
//! variants. Subscriptions filter by `EventTopic`.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ChainEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before backpressure.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
