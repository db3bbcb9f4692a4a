//! # Print-File Pipeline Test Suite
//!
//! Unified test crate for cross-subsystem flows:
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem choreography
//!     └── batch_flow.rs # Dispatch → gate → assemble → seal → manifest
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pf-tests
//! ```

pub mod integration;
