//! # Shared Types Crate
//!
//! Domain entities shared by every subsystem of the print-file pipeline:
//! batch identity, line items, allocated UAC/QID pairs, and the batch
//! configuration parser.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Immutable once loaded**: a `BatchLineItem` never changes after the
//!   configuration is parsed; an `AllocatedPair` is read-only for the
//!   pipeline.
//! - **Batch scoping**: every request, confirmation and fetched pair carries
//!   the `BatchId` so concurrent batches cannot bleed into each other.

pub mod batch_config;
pub mod entities;
pub mod errors;

pub use batch_config::parse_batch_config;
pub use entities::*;
pub use errors::*;
