use alloy_eips::BlockId;
use alloy_network::{AnyNetwork, AnyTxEnvelope};
use alloy_primitives::{B256, U64};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_transport::{TransportError, utils::guess_local_url};
use alloy_transport_http::Http;
use http::header::{ACCEPT_ENCODING, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::models::datasets::transactions::SkippedTransaction;
use crate::models::errors::{PipelineError, RpcError};
use crate::utils::strip_html;

pub const GET_NUM_SKIPPED_TXS: &str = "scroll_getNumSkippedTransactions";
pub const GET_SKIPPED_TX_HASHES: &str = "scroll_getSkippedTransactionHashes";
pub const GET_SKIPPED_TX: &str = "scroll_getSkippedTransaction";
pub const GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK: &str = "scroll_getTxBlockTraceOnTopOfBlock";

/// The node calls the pipeline depends on.
#[allow(async_fn_in_trait)]
pub trait SkippedTxApi {
    async fn count_skipped_transactions(&self) -> Result<u64, RpcError>;

    async fn skipped_transaction_hashes(&self, from: u64, to: u64) -> Result<Vec<B256>, RpcError>;

    async fn skipped_transaction(&self, hash: B256) -> Result<SkippedTransaction, RpcError>;

    /// Executes `tx` on top of `block` and returns the node's block trace as-is.
    async fn trace_block_on_top_of(
        &self,
        tx: &AnyTxEnvelope,
        block: BlockId,
        config: Option<&Value>,
    ) -> Result<Value, RpcError>;
}

/// JSON-RPC client for an l2geth node.
pub struct ScrollClient {
    provider: RootProvider<AnyNetwork>,
}

impl ScrollClient {
    /// Builds the client and checks the node answers `eth_chainId`.
    pub async fn connect(endpoint: &str) -> Result<Self, PipelineError> {
        let connection_error = |message: String| PipelineError::Connection {
            endpoint: endpoint.to_string(),
            message,
        };

        let url: Url = endpoint
            .parse()
            .map_err(|e: url::ParseError| connection_error(e.to_string()))?;
        let http_client = build_http_client().map_err(|e| connection_error(e.to_string()))?;

        let transport = Http::with_client(http_client, url.clone());
        let is_local = guess_local_url(&url);
        let provider = RootProvider::<AnyNetwork>::new(RpcClient::new(transport, is_local));

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| connection_error(strip_html(&e.to_string())))?;
        info!("Connected to {} (chain ID: {})", url, chain_id);

        Ok(Self { provider })
    }
}

// Trace payloads can be large; ask the node for gzip.
fn build_http_client() -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    reqwest::Client::builder()
        .default_headers(headers)
        .gzip(true)
        .build()
}

fn call_error(method: &'static str, e: TransportError) -> RpcError {
    debug!("{} failed. Error details:\n{:#?}", method, e);
    RpcError::Call {
        method,
        message: strip_html(&e.to_string()),
    }
}

impl SkippedTxApi for ScrollClient {
    async fn count_skipped_transactions(&self) -> Result<u64, RpcError> {
        let count: U64 = self
            .provider
            .client()
            .request_noparams(GET_NUM_SKIPPED_TXS)
            .await
            .map_err(|e| call_error(GET_NUM_SKIPPED_TXS, e))?;
        Ok(count.to::<u64>())
    }

    async fn skipped_transaction_hashes(&self, from: u64, to: u64) -> Result<Vec<B256>, RpcError> {
        self.provider
            .client()
            .request::<_, Vec<B256>>(GET_SKIPPED_TX_HASHES, (from, to))
            .await
            .map_err(|e| call_error(GET_SKIPPED_TX_HASHES, e))
    }

    async fn skipped_transaction(&self, hash: B256) -> Result<SkippedTransaction, RpcError> {
        let tx: Option<SkippedTransaction> = self
            .provider
            .client()
            .request(GET_SKIPPED_TX, (hash,))
            .await
            .map_err(|e| call_error(GET_SKIPPED_TX, e))?;
        tx.ok_or_else(|| RpcError::EmptyResponse {
            method: GET_SKIPPED_TX,
            target: hash.to_string(),
        })
    }

    async fn trace_block_on_top_of(
        &self,
        tx: &AnyTxEnvelope,
        block: BlockId,
        config: Option<&Value>,
    ) -> Result<Value, RpcError> {
        self.provider
            .client()
            .request::<_, Value>(
                GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK,
                (tx.clone(), block, config.cloned()),
            )
            .await
            .map_err(|e| call_error(GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK, e))
    }
}
