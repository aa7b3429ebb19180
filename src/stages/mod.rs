pub mod dedup;
pub mod fetch;
pub mod trace;

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::models::datasets::transactions::SkippedTransaction;
use crate::models::errors::PipelineError;
use crate::storage::{list_files, read_json};

pub use dedup::{ConsistencyWarning, DedupSummary, Mismatch, dedup_transactions};
pub use fetch::{FetchSummary, dump_transactions};
pub use trace::{TraceSummary, trace_transactions};

/// Reads every transaction file in `dir` in file name order.
///
/// A file that does not parse aborts the read unless `skip_malformed` is set, in
/// which case it is logged and left out.
pub fn load_transactions(
    dir: &Path,
    skip_malformed: bool,
) -> Result<Vec<(PathBuf, SkippedTransaction)>, PipelineError> {
    let files = list_files(dir)?;
    info!("Reading {} transaction files from {}", files.len(), dir.display());

    let mut txs = Vec::with_capacity(files.len());
    for path in files {
        match read_json::<SkippedTransaction>(&path) {
            Ok(tx) => txs.push((path, tx)),
            Err(e @ PipelineError::Parse { .. }) if skip_malformed => {
                error!("Skipping malformed transaction file: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(txs)
}
