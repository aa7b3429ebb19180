use std::path::PathBuf;

use clap::Parser;

use crate::models::common::Stage;

/// Dump, deduplicate and trace the transactions an l2geth node skipped.
#[derive(Debug, Clone, Parser)]
#[command(name = "skipped-tx-tracer", version)]
pub struct Args {
    /// YAML config file. Missing file means defaults plus environment.
    #[arg(long, env = "SKIPTRACE_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    /// Node JSON-RPC endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Network label, used as the directory namespace (e.g. mainnet, sepolia)
    #[arg(long)]
    pub network: Option<String>,

    /// Stage to run: fetch, dedup, trace or all
    #[arg(long, value_enum)]
    pub stage: Option<Stage>,

    /// Root of the transaction dumps; files go under <txs-dir>/<network>/
    #[arg(long)]
    pub txs_dir: Option<PathBuf>,

    /// Root of the trace output; files go under <traces-dir>/<network>/
    #[arg(long)]
    pub traces_dir: Option<PathBuf>,

    /// Log and skip transaction files that fail to parse
    #[arg(long)]
    pub skip_malformed: bool,
}
