//! # Local Allocation Worker
//!
//! Single-process stand-in for the external allocator: consumes allocation
//! requests from the bus, mints one UAC/QID pair per message, records it in
//! the pair store and publishes a confirmation event.
//!
//! In a distributed deployment this worker is replaced by the remote
//! allocator service; the pipeline only ever sees the bus and the store.

use pf_print_file::StoreError;
use rand::Rng;
use shared_bus::{
    AllocationEvent, InMemoryMessageBus, MessagePublisher, RoutingPattern, REQUEST_QID,
};
use shared_types::{AllocatedPair, QuestionnaireType, UAC_LENGTH};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Alphabet UACs are minted from.
const UAC_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Digits appended to the questionnaire type to form a QID.
const QID_DIGITS: usize = 10;

/// Write surface of the pair store, used by the allocator side only.
///
/// The pipeline itself is read-only against the store; this trait exists so
/// the worker can run against the RocksDB adapter in production and the
/// in-memory adapter in tests.
pub trait PairWriter: Send + Sync {
    /// Persist one freshly minted pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be written.
    fn record_pair(
        &self,
        questionnaire_type: &QuestionnaireType,
        pair: &AllocatedPair,
    ) -> Result<(), StoreError>;
}

/// Mint a 16-character unique access code.
#[must_use]
pub fn mint_uac() -> String {
    let mut rng = rand::thread_rng();
    (0..UAC_LENGTH)
        .map(|_| UAC_ALPHABET[rng.gen_range(0..UAC_ALPHABET.len())] as char)
        .collect()
}

/// Mint a questionnaire identifier: the two-character type followed by
/// random digits. The type prefix is what the store query matches on.
#[must_use]
pub fn mint_qid(questionnaire_type: &QuestionnaireType) -> String {
    let mut rng = rand::thread_rng();
    let digits: String = (0..QID_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    format!("{questionnaire_type}{digits}")
}

/// The allocation worker.
pub struct AllocationWorker<W: PairWriter + 'static> {
    store: Arc<W>,
}

impl<W: PairWriter + 'static> AllocationWorker<W> {
    /// Create a worker over a writable pair store.
    pub fn new(store: Arc<W>) -> Self {
        Self { store }
    }

    /// Subscribe to the request queue and spawn the worker task.
    ///
    /// The subscription is created before this returns, so requests
    /// dispatched immediately afterwards cannot be lost. The task runs
    /// until the shutdown signal flips or the bus closes.
    pub fn spawn(
        self,
        bus: Arc<InMemoryMessageBus>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let mut subscription = bus.subscribe(RoutingPattern::new(REQUEST_QID));

        tokio::spawn(async move {
            info!("Allocation worker started");
            loop {
                tokio::select! {
                    delivery = subscription.recv() => {
                        let Some(delivery) = delivery else {
                            info!("Allocation worker stopping: bus closed");
                            return;
                        };
                        let AllocationEvent::QidRequested { questionnaire_type, batch_id } =
                            delivery.event.clone()
                        else {
                            continue;
                        };

                        let pair = AllocatedPair {
                            uac: mint_uac(),
                            qid: mint_qid(&questionnaire_type),
                            batch_id,
                        };

                        if let Err(e) = self.store.record_pair(&questionnaire_type, &pair) {
                            error!(error = %e, "Allocation worker failed to record pair");
                            return;
                        }

                        subscription.ack(&delivery);

                        let confirmation = AllocationEvent::PairCreated {
                            qid: pair.qid,
                            questionnaire_type,
                            batch_id,
                        };
                        if let Err(e) = bus.publish(confirmation).await {
                            error!(error = %e, "Allocation worker failed to publish confirmation");
                            return;
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("Allocation worker stopping: shutdown signal");
                        return;
                    }
                }
            }
        })
    }
}
