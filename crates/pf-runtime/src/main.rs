//! # Print-File Batch Runner
//!
//! CLI entry point: dispatches allocation requests for a batch, waits for
//! the allocator to confirm every unit, then generates, seals, manifests
//! and delivers the print files.
//!
//! Exits non-zero on any fatal error: gate timeout, quantity mismatch,
//! encryption failure, store or transport failure. Delivery failures are
//! reported but do not fail the run.

use anyhow::{Context, Result};
use clap::Parser;
use pf_dispatch::{expected_total, CompletionGate, RequestDispatcher};
use pf_print_file::{deliver_artifacts, DeliverySink, PrintFileService};
use pf_runtime::adapters::allocator::AllocationWorker;
use pf_runtime::adapters::sinks::{ObjectStorageSink, TransferDirectorySink};
use pf_runtime::adapters::store::RocksDbPairStore;
use pf_runtime::config::RuntimeConfig;
use shared_bus::{InMemoryMessageBus, RoutingPattern, CONFIRMATION_PATTERN};
use shared_crypto::RecipientPublicKey;
use shared_types::{parse_batch_config, BatchId, Supplier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Generate encrypted print files from a batch configuration.
#[derive(Debug, Parser)]
#[command(name = "pf-runtime", version)]
struct Args {
    /// Path to the batch configuration file.
    config_file: PathBuf,

    /// Directory to write output files.
    output_dir: PathBuf,

    /// The supplier the files are going to.
    supplier: String,

    /// UUID for this batch; freshly minted when omitted.
    batch_id: Option<Uuid>,

    /// Don't push the files to object storage.
    #[arg(long)]
    no_object_storage: bool,

    /// Don't copy the files to the supplier transfer share.
    #[arg(long)]
    no_transfer: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = RuntimeConfig::from_env();

    let supplier = Supplier::new(&args.supplier);
    let batch_id = args
        .batch_id
        .map(BatchId::from_uuid)
        .unwrap_or_else(BatchId::mint);

    info!(batch_id = %batch_id, supplier = %supplier, "Starting print-file batch run");

    let config_text = std::fs::read_to_string(&args.config_file)
        .with_context(|| format!("cannot read batch config {}", args.config_file.display()))?;
    let line_items = parse_batch_config(&config_text).context("invalid batch configuration")?;

    // Key material loads up front: failing after allocation would waste
    // the allocator's work.
    let origin = RecipientPublicKey::from_key_file(&config.keys.origin_key_path)
        .context("loading origin public key")?;
    let destination_path = config
        .supplier_key_path(&supplier)
        .with_context(|| format!("no public key configured for supplier {supplier}"))?;
    let destination = RecipientPublicKey::from_key_file(destination_path)
        .context("loading supplier public key")?;

    let bus = Arc::new(InMemoryMessageBus::new());
    let store =
        Arc::new(RocksDbPairStore::open(&config.store.data_dir).context("opening pair store")?);

    // The worker subscribes before anything is dispatched.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let worker_handle =
        AllocationWorker::new(Arc::clone(&store)).spawn(Arc::clone(&bus), shutdown_rx);

    // The gate's batch-scoped subscription also exists before dispatch, so
    // confirmations cannot race past it.
    let gate_subscription = bus.subscribe(RoutingPattern::new(CONFIRMATION_PATTERN));

    let dispatcher = RequestDispatcher::new(Arc::clone(&bus));
    dispatcher
        .dispatch_batch(&line_items, batch_id)
        .await
        .context("dispatching allocation requests")?;

    let expected = expected_total(&line_items);
    let gate = CompletionGate::new(Duration::from_secs(config.gate.timeout_secs));
    gate.await_completion(gate_subscription, batch_id, expected)
        .await
        .context("awaiting batch completion")?;

    let service = PrintFileService::new(Arc::clone(&store));
    let artifacts = service
        .generate_batch(
            &line_items,
            batch_id,
            &supplier,
            &origin,
            &destination,
            &args.output_dir,
        )
        .context("generating print files")?;

    info!(
        batch_id = %batch_id,
        artifacts = artifacts.len(),
        output_dir = %args.output_dir.display(),
        "Batch generated"
    );

    let mut sinks: Vec<Arc<dyn DeliverySink>> = Vec::new();
    if !args.no_object_storage {
        if let Some(object_storage) = &config.delivery.object_storage {
            sinks.push(Arc::new(ObjectStorageSink::new(object_storage)));
        }
    }
    if !args.no_transfer {
        if let Some(transfer_dir) = config.supplier_transfer_dir(&supplier) {
            sinks.push(Arc::new(TransferDirectorySink::new(transfer_dir.clone())));
        }
    }

    let failures = deliver_artifacts(&sinks, &artifacts).await;
    if failures > 0 {
        warn!(
            failures,
            "Some deliveries failed; artifacts remain valid, retry delivery manually"
        );
    }

    let _ = shutdown_tx.send(true);
    let _ = worker_handle.await;

    info!(batch_id = %batch_id, "Print-file batch run complete");
    Ok(())
}
