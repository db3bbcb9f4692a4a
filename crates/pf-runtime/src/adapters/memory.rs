//! # In-Memory Pair Store
//!
//! Pair store for single-process tests and dry runs; implements the same
//! read and write surfaces as the RocksDB adapter.

use crate::adapters::allocator::PairWriter;
use parking_lot::RwLock;
use pf_print_file::{PairStore, PairStream, StoreError};
use shared_types::{AllocatedPair, BatchId, QuestionnaireType};

/// In-memory pair store.
#[derive(Default)]
pub struct InMemoryPairStore {
    pairs: RwLock<Vec<(String, AllocatedPair)>>,
}

impl InMemoryPairStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    /// Whether the store holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }
}

impl PairWriter for InMemoryPairStore {
    fn record_pair(
        &self,
        questionnaire_type: &QuestionnaireType,
        pair: &AllocatedPair,
    ) -> Result<(), StoreError> {
        self.pairs
            .write()
            .push((questionnaire_type.as_str().to_string(), pair.clone()));
        Ok(())
    }
}

impl PairStore for InMemoryPairStore {
    fn fetch_unlinked(
        &self,
        questionnaire_type: &QuestionnaireType,
        batch_id: BatchId,
    ) -> Result<PairStream, StoreError> {
        let pairs: Vec<Result<AllocatedPair, StoreError>> = self
            .pairs
            .read()
            .iter()
            .filter(|(qtype, pair)| {
                qtype == questionnaire_type.as_str() && pair.batch_id == batch_id
            })
            .map(|(_, pair)| Ok(pair.clone()))
            .collect();
        Ok(Box::new(pairs.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_fetch() {
        let store = InMemoryPairStore::new();
        let qtype = QuestionnaireType::new("01").unwrap();
        let batch_id = BatchId::mint();

        store
            .record_pair(
                &qtype,
                &AllocatedPair {
                    uac: "UACAAAAAAAAAAAA1".to_string(),
                    qid: "0100000001".to_string(),
                    batch_id,
                },
            )
            .unwrap();

        let fetched: Vec<_> = store
            .fetch_unlinked(&qtype, batch_id)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(fetched.len(), 1);

        // Other batches see nothing
        let other: Vec<_> = store
            .fetch_unlinked(&qtype, BatchId::mint())
            .unwrap()
            .collect();
        assert!(other.is_empty());
    }
}
