use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
pub const DEFAULT_NETWORK: &str = "mainnet";
pub const DEFAULT_TXS_DIR: &str = "txs";
pub const DEFAULT_TRACES_DIR: &str = "traces";
const DEDUP_SUBDIR: &str = "dedupped";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_url: String,
    pub network: String,
    pub stage: Stage,
    pub txs_dir: PathBuf,
    pub traces_dir: PathBuf,
    // Log and skip unparseable transaction files instead of aborting
    pub skip_malformed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            network: DEFAULT_NETWORK.to_string(),
            stage: Stage::All,
            txs_dir: PathBuf::from(DEFAULT_TXS_DIR),
            traces_dir: PathBuf::from(DEFAULT_TRACES_DIR),
            skip_malformed: false,
        }
    }
}

impl Config {
    pub fn paths(&self) -> Paths {
        Paths::new(&self.txs_dir, &self.traces_dir, &self.network)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Dedup,
    Trace,
    All,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Dedup => "dedup",
            Self::Trace => "trace",
            Self::All => "all",
        }
    }

    pub fn runs_fetch(&self) -> bool {
        matches!(self, Self::Fetch | Self::All)
    }

    pub fn runs_dedup(&self) -> bool {
        matches!(self, Self::Dedup | Self::All)
    }

    pub fn runs_trace(&self) -> bool {
        matches!(self, Self::Trace | Self::All)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory layout for one network namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub dump_dir: PathBuf,
    pub dedup_from_dir: PathBuf,
    pub dedup_to_dir: PathBuf,
    pub traces_dir: PathBuf,
}

impl Paths {
    pub fn new(txs_root: &Path, traces_root: &Path, network: &str) -> Self {
        let txs = txs_root.join(network);
        Self {
            dump_dir: txs.clone(),
            dedup_from_dir: txs.clone(),
            dedup_to_dir: txs.join(DEDUP_SUBDIR),
            traces_dir: traces_root.join(network),
        }
    }
}
