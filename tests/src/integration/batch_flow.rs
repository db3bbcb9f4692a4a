//! # End-to-End Batch Flow Tests
//!
//! Exercises the complete choreography in one process:
//!
//! ```text
//! [Dispatcher] ──N × QidRequested──→ [Bus] ──→ [AllocationWorker]
//!                                                │ mint + store
//! [CompletionGate] ◄──N × PairCreated────────────┘
//!        │ releases at N
//!        ▼
//! [PrintFileService] ── fetch → assemble → seal → manifest
//!        │
//!        ▼
//! artifacts decryptable by both key holders, manifests reproducible
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy path**: full batch, both recipients decrypt, manifests check
//! 2. **Timeout handling**: gate fails the batch short of the expected count
//! 3. **Reconciliation**: quantity mismatch aborts the batch

// =============================================================================
// TEST FIXTURES (only compiled during tests)
// =============================================================================

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use parking_lot::Mutex;

#[cfg(test)]
use pf_dispatch::{expected_total, CompletionGate, DispatchError, RequestDispatcher};

#[cfg(test)]
use pf_print_file::{
    checksum_hex, Manifest, PairStore, PairStream, PrintFileError, PrintFileService, StoreError,
};

#[cfg(test)]
use pf_runtime::{AllocationWorker, InMemoryPairStore};

#[cfg(test)]
use shared_bus::{InMemoryMessageBus, RoutingPattern, CONFIRMATION_PATTERN};

#[cfg(test)]
use shared_crypto::RecipientKeyPair;

#[cfg(test)]
use shared_types::{
    parse_batch_config, AllocatedPair, BatchId, BatchLineItem, QuestionnaireType, Supplier,
};

/// Builds a line item for tests.
#[cfg(test)]
fn line_item(qtype: &str, pack_code: &str, quantity: u32) -> BatchLineItem {
    BatchLineItem::new(
        QuestionnaireType::new(qtype).unwrap(),
        shared_types::PackCode::new(pack_code),
        quantity,
    )
    .unwrap()
}

/// A store whose successive fetches yield scripted pair sequences, for
/// scenarios where two line items share a questionnaire type.
#[cfg(test)]
struct SequencedPairStore {
    fetches: Mutex<Vec<Vec<AllocatedPair>>>,
}

#[cfg(test)]
impl SequencedPairStore {
    fn new(fetches: Vec<Vec<AllocatedPair>>) -> Self {
        Self {
            fetches: Mutex::new(fetches),
        }
    }
}

#[cfg(test)]
impl PairStore for SequencedPairStore {
    fn fetch_unlinked(
        &self,
        _questionnaire_type: &QuestionnaireType,
        _batch_id: BatchId,
    ) -> Result<PairStream, StoreError> {
        let mut fetches = self.fetches.lock();
        let pairs = if fetches.is_empty() {
            Vec::new()
        } else {
            fetches.remove(0)
        };
        Ok(Box::new(pairs.into_iter().map(Ok)))
    }
}

#[cfg(test)]
fn pair(uac: &str, qid: &str, batch_id: BatchId) -> AllocatedPair {
    AllocatedPair {
        uac: uac.to_string(),
        qid: qid.to_string(),
        batch_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_batch_choreography() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let store = Arc::new(InMemoryPairStore::new());
        let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let _worker =
            AllocationWorker::new(Arc::clone(&store)).spawn(Arc::clone(&bus), shutdown_rx);

        let config_text =
            "Questionnaire type,Pack code,Quantity\n01,D_FD_H1,2\n02,D_CCS_CH1,1\n";
        let line_items = parse_batch_config(config_text).unwrap();
        let batch_id = BatchId::mint();

        // Gate subscription exists before anything is dispatched
        let gate_subscription = bus.subscribe(RoutingPattern::new(CONFIRMATION_PATTERN));

        let dispatcher = RequestDispatcher::new(Arc::clone(&bus));
        let published = dispatcher.dispatch_batch(&line_items, batch_id).await.unwrap();
        assert_eq!(published, 3);

        let gate = CompletionGate::new(Duration::from_secs(5));
        let stats = gate
            .await_completion(gate_subscription, batch_id, expected_total(&line_items))
            .await
            .unwrap();
        assert_eq!(stats.confirmations, 3);
        assert_eq!(store.len(), 3);

        // Generate the print files
        let origin = RecipientKeyPair::generate();
        let destination = RecipientKeyPair::generate();
        let output_dir = tempfile::tempdir().unwrap();

        let service = PrintFileService::new(Arc::clone(&store));
        let artifacts = service
            .generate_batch(
                &line_items,
                batch_id,
                &Supplier::new("QM"),
                &origin.public_key(),
                &destination.public_key(),
                output_dir.path(),
            )
            .unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].rows, 2);
        assert_eq!(artifacts[1].rows, 1);

        // Both key holders independently recover identical plaintext
        let sealed = std::fs::read(&artifacts[0].print_file).unwrap();
        let via_destination = shared_crypto::open(&sealed, &destination).unwrap();
        let via_origin = shared_crypto::open(&sealed, &origin).unwrap();
        assert_eq!(via_destination, via_origin);

        let text = String::from_utf8(via_destination).unwrap();
        assert_eq!(text.matches("\r\n").count(), 2);
        for row in text.lines() {
            let fields: Vec<&str> = row.split('|').collect();
            assert_eq!(fields[0].len(), 16, "standard rows carry a 16-char UAC");
            assert!(fields[1].starts_with("01"));
            assert_eq!(*fields.last().unwrap(), "D_FD_H1");
        }

        // The no-identifier file has empty UAC fields and populated QIDs
        let ccs_sealed = std::fs::read(&artifacts[1].print_file).unwrap();
        let ccs_text =
            String::from_utf8(shared_crypto::open(&ccs_sealed, &destination).unwrap()).unwrap();
        for row in ccs_text.lines() {
            let fields: Vec<&str> = row.split('|').collect();
            assert!(fields[0].is_empty(), "no-identifier rows omit the UAC");
            assert!(fields[1].starts_with("02"));
            assert_eq!(*fields.last().unwrap(), "D_CCS_CH1");
        }

        // Manifests describe the persisted ciphertext exactly
        for artifact in &artifacts {
            let manifest: Manifest =
                serde_json::from_slice(&std::fs::read(&artifact.manifest_file).unwrap()).unwrap();
            let persisted = std::fs::read(&artifact.print_file).unwrap();
            let file = &manifest.files[0];
            assert_eq!(file.checksum, checksum_hex(&persisted));
            assert_eq!(file.size_bytes, persisted.len() as u64);
            assert_eq!(file.rows, artifact.rows);
        }
    }

    #[tokio::test]
    async fn test_gate_timeout_fails_batch_before_any_file() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let gate_subscription = bus.subscribe(RoutingPattern::new(CONFIRMATION_PATTERN));
        let batch_id = BatchId::mint();

        // Two confirmations arrive; the third never does
        let publisher = Arc::clone(&bus);
        tokio::spawn(async move {
            use shared_bus::{AllocationEvent, MessagePublisher};
            for n in 0..2 {
                publisher
                    .publish(AllocationEvent::PairCreated {
                        qid: format!("01{n:08}"),
                        questionnaire_type: QuestionnaireType::new("01").unwrap(),
                        batch_id,
                    })
                    .await
                    .unwrap();
            }
        });

        let gate = CompletionGate::new(Duration::from_millis(300));
        let result = gate.await_completion(gate_subscription, batch_id, 3).await;

        assert_eq!(
            result,
            Err(DispatchError::GateTimeout {
                expected: 3,
                received: 2
            })
        );
    }

    #[tokio::test]
    async fn test_spec_scenario_two_artifacts_same_type() {
        // Two line items sharing questionnaire type 01: the store yields
        // disjoint pair sets per fetch
        let batch_id = BatchId::mint();
        let store = Arc::new(SequencedPairStore::new(vec![
            vec![
                pair("UACAAAAAAAAAAAA1", "0100000001", batch_id),
                pair("UACAAAAAAAAAAAA2", "0100000002", batch_id),
            ],
            vec![pair("UACAAAAAAAAAAAA3", "0100000003", batch_id)],
        ]));

        let line_items = vec![line_item("01", "D_FD_H1", 2), line_item("01", "D_FD_H2", 1)];
        let origin = RecipientKeyPair::generate();
        let destination = RecipientKeyPair::generate();
        let output_dir = tempfile::tempdir().unwrap();

        let service = PrintFileService::new(store);
        let artifacts = service
            .generate_batch(
                &line_items,
                batch_id,
                &Supplier::new("QM"),
                &origin.public_key(),
                &destination.public_key(),
                output_dir.path(),
            )
            .unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].rows, 2);
        assert_eq!(artifacts[1].rows, 1);

        for artifact in &artifacts {
            let manifest: Manifest =
                serde_json::from_slice(&std::fs::read(&artifact.manifest_file).unwrap()).unwrap();
            let persisted = std::fs::read(&artifact.print_file).unwrap();
            assert_eq!(manifest.files[0].checksum, checksum_hex(&persisted));
            assert_eq!(manifest.files[0].rows, artifact.rows);
        }
    }

    #[tokio::test]
    async fn test_quantity_mismatch_aborts_whole_batch() {
        let batch_id = BatchId::mint();
        let store = Arc::new(SequencedPairStore::new(vec![vec![
            pair("UACAAAAAAAAAAAA1", "0100000001", batch_id),
            pair("UACAAAAAAAAAAAA2", "0100000002", batch_id),
        ]]));

        let line_items = vec![line_item("01", "D_FD_H1", 10)];
        let origin = RecipientKeyPair::generate();
        let destination = RecipientKeyPair::generate();
        let output_dir = tempfile::tempdir().unwrap();

        let service = PrintFileService::new(store);
        let result = service.generate_batch(
            &line_items,
            batch_id,
            &Supplier::new("QM"),
            &origin.public_key(),
            &destination.public_key(),
            output_dir.path(),
        );

        let err = result.unwrap_err();
        assert!(matches!(err, PrintFileError::QuantityMismatch { .. }));
        assert!(err
            .to_string()
            .contains("expected = 10, found = 2, questionnaire type = 01"));

        // Nothing was produced for the failed batch
        assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
    }
}
