//! Ports of the print-file subsystem.

pub mod outbound;

pub use outbound::{DeliverySink, PairStore, PairStream, SinkError, StoreError};
