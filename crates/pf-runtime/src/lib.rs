//! # Print-File Runtime
//!
//! Process wiring for the batch pipeline: environment-derived
//! configuration, concrete adapters behind the subsystem ports, and the
//! local allocation worker.
//!
//! ## Startup Sequence
//!
//! 1. Load [`config::RuntimeConfig`] from the environment (once, at start)
//! 2. Open the pair store and create the in-process bus
//! 3. Spawn the allocation worker (subscribed before anything is published)
//! 4. Dispatch allocation requests for the batch
//! 5. Block on the completion gate
//! 6. Generate, seal and manifest the print files per line item
//! 7. Push artifacts to the configured delivery sinks (best-effort)
//!
//! The binary in `main.rs` drives this sequence; the pieces are exposed
//! here so the workspace test suite can compose them against in-memory
//! adapters.

pub mod adapters;
pub mod config;

pub use adapters::allocator::{mint_qid, mint_uac, AllocationWorker, PairWriter};
pub use adapters::memory::InMemoryPairStore;
pub use adapters::sinks::{ObjectStorageSink, TransferDirectorySink};
pub use adapters::store::RocksDbPairStore;
pub use config::RuntimeConfig;
