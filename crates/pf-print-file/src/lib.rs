//! # Print-File Subsystem
//!
//! Assembles, reconciles, seals and manifests the batch print files.
//!
//! ## Architecture Role
//!
//! ```text
//! [CompletionGate released]
//!         │
//!         ▼  per line item, in configuration order
//! [PairStore] ──pairs──→ [RowBuilder] ──rows──→ [FileAssembler]
//!                                                    │ exact-quantity check
//!                                                    ▼
//!                                            [EncryptionEnvelope]
//!                                                    │
//!                                                    ▼
//!                                 {pack}_{ts}.csv.sealed + .manifest
//!                                                    │
//!                                                    ▼
//!                                            [DeliverySinks]
//! ```
//!
//! The exact-quantity check in the assembler is the last point at which a
//! systemic allocation error can be caught before security-sensitive output
//! leaves the system; any mismatch fails the whole batch.

pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::assembler::{assemble, AssembledFile, FIELD_DELIMITER, LINE_TERMINATOR};
pub use domain::catalog::{
    pack_code_entry, supplier_template, PackCodeEntry, RowVariant, SupplierTemplate,
};
pub use domain::manifest::{build_manifest, checksum_hex, Manifest, ManifestFile};
pub use domain::row::{build_row, PrintRow};
pub use errors::PrintFileError;
pub use ports::outbound::{DeliverySink, PairStore, PairStream, SinkError, StoreError};
pub use service::{
    deliver_artifacts, GeneratedArtifact, PrintFileService, MANIFEST_EXTENSION, SEALED_EXTENSION,
};
