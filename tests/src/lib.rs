//! # TBURN Test Suite
//!
//! Unified integration test crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate scenarios
//!     ├── production.rs    # producer timing, chaining, lifecycle
//!     └── coordination.rs  # routing, failure accounting, listener lifecycle
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tb-tests
//! cargo test -p tb-tests integration::production
//! cargo test -p tb-tests integration::coordination
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
