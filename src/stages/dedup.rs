use std::collections::HashMap;
use std::path::PathBuf;

use alloy_primitives::B256;
use tracing::{error, info, warn};

use crate::models::common::Paths;
use crate::models::datasets::transactions::SkippedTransaction;
use crate::models::errors::PipelineError;
use crate::stages::load_transactions;
use crate::storage::{ensure_dir, write_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    SkipReason,
    Accesses,
}

/// A duplicate that disagrees with the record kept for its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyWarning {
    pub hash: B256,
    pub representative: B256,
    pub mismatch: Mismatch,
}

#[derive(Debug, Default)]
pub struct Deduplicator {
    index: HashMap<String, usize>,
    accepted: Vec<SkippedTransaction>,
    duplicates: usize,
    warnings: Vec<ConsistencyWarning>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `tx` is the first record seen for its input.
    pub fn insert(&mut self, tx: SkippedTransaction) -> bool {
        let key = tx.dedup_key();
        let Some(&idx) = self.index.get(&key) else {
            self.index.insert(key, self.accepted.len());
            self.accepted.push(tx);
            return true;
        };

        let prev = &self.accepted[idx];
        if tx.skip_reason != prev.skip_reason {
            warn!(
                "Duplicate {} of {} has a different skip reason: {:?} != {:?}",
                tx.hash, prev.hash, tx.skip_reason, prev.skip_reason
            );
            self.warnings.push(ConsistencyWarning {
                hash: tx.hash,
                representative: prev.hash,
                mismatch: Mismatch::SkipReason,
            });
        }
        if tx.accesses != prev.accesses {
            warn!("Duplicate {} of {} has different accesses", tx.hash, prev.hash);
            self.warnings.push(ConsistencyWarning {
                hash: tx.hash,
                representative: prev.hash,
                mismatch: Mismatch::Accesses,
            });
        }

        self.duplicates += 1;
        false
    }

    pub fn accepted(&self) -> &[SkippedTransaction] {
        &self.accepted
    }

    pub fn warnings(&self) -> &[ConsistencyWarning] {
        &self.warnings
    }
}

#[derive(Debug, Default)]
pub struct DedupSummary {
    pub read: usize,
    pub duplicates: usize,
    pub warnings: Vec<ConsistencyWarning>,
    pub written: Vec<PathBuf>,
    pub write_failures: Vec<B256>,
}

/// Keeps the first transaction seen for each distinct input and writes those to
/// `paths.dedup_to_dir`.
///
/// Reading is all-or-nothing (see [`load_transactions`]). Writing is per record: a
/// record that cannot be written is logged and the rest still go out.
pub fn dedup_transactions(paths: &Paths, skip_malformed: bool) -> Result<DedupSummary, PipelineError> {
    let txs = load_transactions(&paths.dedup_from_dir, skip_malformed)?;

    let mut summary = DedupSummary {
        read: txs.len(),
        ..Default::default()
    };

    let mut deduplicator = Deduplicator::new();
    for (_, tx) in txs {
        deduplicator.insert(tx);
    }
    summary.duplicates = deduplicator.duplicates;
    info!(
        "{} unique transactions, {} duplicates, {} consistency warnings",
        deduplicator.accepted.len(),
        deduplicator.duplicates,
        deduplicator.warnings.len()
    );

    ensure_dir(&paths.dedup_to_dir)?;
    for tx in deduplicator.accepted() {
        match write_json(&paths.dedup_to_dir, &tx.file_name(), tx) {
            Ok(path) => summary.written.push(path),
            Err(e) => {
                error!("Failed to write deduplicated transaction {}: {}", tx.hash, e);
                summary.write_failures.push(tx.hash);
            }
        }
    }
    summary.warnings = deduplicator.warnings;

    info!(
        "Wrote {} deduplicated transactions to {}",
        summary.written.len(),
        paths.dedup_to_dir.display()
    );
    Ok(summary)
}
