use std::path::PathBuf;

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::B256;
use tracing::{error, info, warn};

use crate::models::common::Paths;
use crate::models::datasets::transactions::envelope_hash;
use crate::models::errors::PipelineError;
use crate::rpc::SkippedTxApi;
use crate::stages::load_transactions;
use crate::storage::{ensure_dir, write_json};

#[derive(Debug, Default)]
pub struct TraceSummary {
    pub total: usize,
    pub traced: Vec<PathBuf>,
    // Node refused to trace
    pub failed: Vec<B256>,
    // Not sent to the node at all
    pub skipped: Vec<B256>,
}

/// Replays each deduplicated transaction on top of its skip block and stores the
/// node's trace under `paths.traces_dir`.
///
/// Tracing is best effort: a record the node cannot trace is logged and the pass
/// moves on. Reading the inputs and writing a trace remain fatal.
pub async fn trace_transactions<C: SkippedTxApi>(
    client: &C,
    paths: &Paths,
    skip_malformed: bool,
) -> Result<TraceSummary, PipelineError> {
    let txs = load_transactions(&paths.dedup_to_dir, skip_malformed)?;
    ensure_dir(&paths.traces_dir)?;

    let total = txs.len();
    let mut summary = TraceSummary {
        total,
        ..Default::default()
    };

    for (i, (path, record)) in txs.into_iter().enumerate() {
        info!("Tracing transaction {}/{}: {}", i + 1, total, record.hash);

        let tx = match record.to_envelope() {
            Ok(tx) => tx,
            Err(e) => {
                error!(
                    "Failed to decode transaction {} from {}: {}",
                    record.hash,
                    path.display(),
                    e
                );
                summary.skipped.push(record.hash);
                continue;
            }
        };

        let tx_hash = envelope_hash(&tx);
        if tx_hash != record.hash {
            warn!(
                "Decoded transaction hash {} does not match recorded hash {}",
                tx_hash, record.hash
            );
        }

        let Some(block_number) = record.block_number() else {
            error!("Transaction {} has no skipBlockNumber", record.hash);
            summary.skipped.push(record.hash);
            continue;
        };
        let block = BlockId::Number(BlockNumberOrTag::Number(block_number));

        let trace = match client.trace_block_on_top_of(&tx, block, None).await {
            Ok(trace) => trace,
            Err(e) => {
                error!("Failed to trace transaction {}: {}", record.hash, e);
                summary.failed.push(record.hash);
                continue;
            }
        };

        let out = write_json(&paths.traces_dir, &record.file_name(), &trace)?;
        summary.traced.push(out);
    }

    info!(
        "Traced {}/{} transactions ({} failed, {} skipped)",
        summary.traced.len(),
        total,
        summary.failed.len(),
        summary.skipped.len()
    );
    Ok(summary)
}
