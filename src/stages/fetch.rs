use std::path::PathBuf;

use tracing::info;

use crate::models::common::Paths;
use crate::models::errors::PipelineError;
use crate::rpc::SkippedTxApi;
use crate::storage::{ensure_dir, write_json};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub reported: u64,
    pub written: Vec<PathBuf>,
}

/// Downloads every skipped transaction the node knows about into `paths.dump_dir`.
///
/// The first RPC or IO failure aborts the stage; files already written stay on disk.
pub async fn dump_transactions<C: SkippedTxApi>(
    client: &C,
    paths: &Paths,
) -> Result<FetchSummary, PipelineError> {
    let n_skipped = client.count_skipped_transactions().await?;
    info!("Node reports {} skipped transactions", n_skipped);

    ensure_dir(&paths.dump_dir)?;

    let mut summary = FetchSummary {
        reported: n_skipped,
        ..Default::default()
    };
    if n_skipped == 0 {
        return Ok(summary);
    }

    let hashes = client.skipped_transaction_hashes(0, n_skipped).await?;

    let total = hashes.len();
    for (i, hash) in hashes.into_iter().enumerate() {
        info!("Fetching skipped transaction {}/{}: {}", i + 1, total, hash);

        let tx = client.skipped_transaction(hash).await?;
        let path = write_json(&paths.dump_dir, &tx.file_name(), &tx)?;
        summary.written.push(path);
    }

    info!("Dumped {} transactions to {}", summary.written.len(), paths.dump_dir.display());
    Ok(summary)
}
