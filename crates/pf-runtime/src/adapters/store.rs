//! # RocksDB Pair Store Adapter
//!
//! Persistent allocated-pair store. The allocation worker writes pair
//! records; the pipeline reads them back with prefix scans scoped to
//! (questionnaire type, batch).

use crate::adapters::allocator::PairWriter;
use pf_print_file::{PairStore, PairStream, StoreError};
use rocksdb::{Direction, IteratorMode, DB};
use serde::{Deserialize, Serialize};
use shared_types::{AllocatedPair, BatchId, QuestionnaireType};
use std::path::Path;

/// One stored pair record.
///
/// `case_ref` is populated when a pair is later bound to a real-world
/// case; such pairs are excluded from print-file fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPair {
    uac: String,
    qid: String,
    batch_id: BatchId,
    case_ref: Option<String>,
}

/// RocksDB-backed pair store.
pub struct RocksDbPairStore {
    db: DB,
}

impl RocksDbPairStore {
    /// Open (or create) the store at a directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` when the database cannot be
    /// opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = DB::open_default(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { db })
    }

    fn pair_key(questionnaire_type: &QuestionnaireType, batch_id: BatchId, qid: &str) -> Vec<u8> {
        format!("pair:{questionnaire_type}:{batch_id}:{qid}").into_bytes()
    }

    fn scan_prefix(questionnaire_type: &QuestionnaireType, batch_id: BatchId) -> Vec<u8> {
        format!("pair:{questionnaire_type}:{batch_id}:").into_bytes()
    }
}

impl PairWriter for RocksDbPairStore {
    fn record_pair(
        &self,
        questionnaire_type: &QuestionnaireType,
        pair: &AllocatedPair,
    ) -> Result<(), StoreError> {
        let record = StoredPair {
            uac: pair.uac.clone(),
            qid: pair.qid.clone(),
            batch_id: pair.batch_id,
            case_ref: None,
        };
        let value =
            serde_json::to_vec(&record).map_err(|e| StoreError::CorruptRecord(e.to_string()))?;
        self.db
            .put(
                Self::pair_key(questionnaire_type, pair.batch_id, &pair.qid),
                value,
            )
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}

impl PairStore for RocksDbPairStore {
    fn fetch_unlinked(
        &self,
        questionnaire_type: &QuestionnaireType,
        batch_id: BatchId,
    ) -> Result<PairStream, StoreError> {
        let prefix = Self::scan_prefix(questionnaire_type, batch_id);

        let mut pairs: Vec<Result<AllocatedPair, StoreError>> = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(&prefix, Direction::Forward));
        for entry in iter {
            let (key, value) = entry.map_err(|e| StoreError::Query(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            match serde_json::from_slice::<StoredPair>(&value) {
                Ok(record) if record.case_ref.is_none() => {
                    pairs.push(Ok(AllocatedPair {
                        uac: record.uac,
                        qid: record.qid,
                        batch_id: record.batch_id,
                    }));
                }
                Ok(_) => {} // bound to a case, excluded
                Err(e) => pairs.push(Err(StoreError::CorruptRecord(e.to_string()))),
            }
        }

        Ok(Box::new(pairs.into_iter()))
    }
}
