//! # Allocation Dispatch Subsystem
//!
//! Requests UAC/QID allocation from the external allocator and blocks the
//! batch until the allocator has confirmed every requested unit.
//!
//! ## Protocol
//!
//! ```text
//! [Dispatcher] ──N × QidRequested──→ [work queue]──→ [Allocator]
//!                                                         │
//!      [CompletionGate] ◄──N × PairCreated (event.uac.*)──┘
//!            │
//!            ▼ releases caller at N, or GateTimeout
//! ```
//!
//! The gate is a synchronous rendezvous, not a polling loop: it suspends on
//! message arrival and either releases exactly when the confirmation count
//! reaches the expected total, or fails the whole batch on timeout. There is
//! no retry past timeout: the operator re-runs with a fresh batch id so
//! partially allocated batches can never double-count.

pub mod dispatcher;
pub mod errors;
pub mod gate;

pub use dispatcher::{expected_total, RequestDispatcher};
pub use errors::DispatchError;
pub use gate::{CompletionGate, GateStats};
