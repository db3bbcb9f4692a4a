//! Cross-subsystem integration flows.

pub mod batch_flow;
