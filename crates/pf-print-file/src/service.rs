//! # Print-File Service
//!
//! Orchestrates the per-line-item pipeline after the completion gate has
//! released: fetch → rows → assemble → seal → manifest → write.
//!
//! Line items are processed sequentially in configuration order, which
//! keeps output ordering deterministic. Any validation or reconciliation
//! failure aborts the whole batch; there is no partial-success state.
//! Delivery is a separate, best-effort step that never invalidates an
//! already-manifested artifact.

use crate::domain::assembler::assemble;
use crate::domain::catalog::{pack_code_entry, supplier_template};
use crate::domain::manifest::build_manifest;
use crate::errors::PrintFileError;
use crate::ports::outbound::{DeliverySink, PairStore};
use chrono::Utc;
use shared_crypto::RecipientPublicKey;
use shared_types::{BatchId, BatchLineItem, PackCode, Supplier};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// File extension of the sealed print file (on top of `.csv`).
pub const SEALED_EXTENSION: &str = "csv.sealed";

/// File extension of the manifest.
pub const MANIFEST_EXTENSION: &str = "manifest";

/// Timestamp format used in artifact file names.
const FILENAME_TIMESTAMP: &str = "%Y-%m-%dT%H-%M-%S";

/// One generated artifact pair (print file + manifest, same stem).
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    /// Path of the sealed print file.
    pub print_file: PathBuf,
    /// Path of the manifest, same stem as the print file.
    pub manifest_file: PathBuf,
    /// Pack code the artifact was generated for.
    pub pack_code: PackCode,
    /// Rows inside the (decrypted) print file.
    pub rows: u32,
}

/// The batch print-file generator.
pub struct PrintFileService<S: PairStore> {
    store: Arc<S>,
}

impl<S: PairStore> PrintFileService<S> {
    /// Create a service over a pair store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Generate sealed print files and manifests for every line item.
    ///
    /// Returns the generated artifacts in configuration order.
    ///
    /// # Errors
    ///
    /// Any [`PrintFileError`] aborts the batch: quantity mismatch, unknown
    /// pack code or supplier, store failure, sealing failure, or I/O
    /// failure. Artifacts already written for earlier line items are left
    /// on disk but must not be delivered.
    pub fn generate_batch(
        &self,
        line_items: &[BatchLineItem],
        batch_id: BatchId,
        supplier: &Supplier,
        origin: &RecipientPublicKey,
        destination: &RecipientPublicKey,
        output_dir: &Path,
    ) -> Result<Vec<GeneratedArtifact>, PrintFileError> {
        let template = supplier_template(supplier)
            .ok_or_else(|| PrintFileError::UnknownSupplier(supplier.to_string()))?;

        let mut artifacts = Vec::with_capacity(line_items.len());

        for item in line_items {
            let entry = pack_code_entry(&item.pack_code)
                .ok_or_else(|| PrintFileError::UnknownPackCode(item.pack_code.to_string()))?;

            let pairs = self
                .store
                .fetch_unlinked(&item.questionnaire_type, batch_id)?;
            let assembled = assemble(pairs, item, template, entry.variant)?;

            let sealed = shared_crypto::seal(&assembled.bytes, origin, destination)?;

            let stem = format!(
                "{}_{}",
                item.pack_code,
                Utc::now().format(FILENAME_TIMESTAMP)
            );
            let print_file = output_dir.join(format!("{stem}.{SEALED_EXTENSION}"));
            write_file(&print_file, &sealed)?;

            let manifest = build_manifest(&print_file, &item.pack_code, assembled.rows)?;
            let manifest_file = output_dir.join(format!("{stem}.{MANIFEST_EXTENSION}"));
            let manifest_json = serde_json::to_vec(&manifest).map_err(|e| PrintFileError::Io {
                path: manifest_file.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;
            write_file(&manifest_file, &manifest_json)?;

            info!(
                batch_id = %batch_id,
                pack_code = %item.pack_code,
                rows = assembled.rows,
                print_file = %print_file.display(),
                "Print file generated"
            );

            artifacts.push(GeneratedArtifact {
                print_file,
                manifest_file,
                pack_code: item.pack_code.clone(),
                rows: assembled.rows,
            });
        }

        Ok(artifacts)
    }
}

/// Push every artifact (print file and manifest) to every sink.
///
/// Best-effort: failures are logged per file and counted, never escalated.
/// The artifacts stay valid and the operator retries delivery.
pub async fn deliver_artifacts(
    sinks: &[Arc<dyn DeliverySink>],
    artifacts: &[GeneratedArtifact],
) -> u32 {
    let mut failures = 0u32;

    for sink in sinks {
        for artifact in artifacts {
            for path in [&artifact.print_file, &artifact.manifest_file] {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match sink.deliver(&file_name, path).await {
                    Ok(()) => {
                        info!(sink = sink.name(), file = %file_name, "Artifact delivered");
                    }
                    Err(e) => {
                        warn!(sink = sink.name(), file = %file_name, error = %e, "Delivery failed");
                        failures += 1;
                    }
                }
            }
        }
    }

    failures
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PrintFileError> {
    std::fs::write(path, bytes).map_err(|source| PrintFileError::Io {
        path: path.display().to_string(),
        source,
    })
}
