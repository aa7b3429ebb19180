use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::B256;
use anyhow::Result;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use skipped_tx_tracer::models::datasets::transactions::SkippedTransaction;
use skipped_tx_tracer::models::errors::{PipelineError, RpcError};
use skipped_tx_tracer::rpc::{
    GET_NUM_SKIPPED_TXS, GET_SKIPPED_TX, GET_SKIPPED_TX_HASHES,
    GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK, ScrollClient, SkippedTxApi,
};

const KNOWN_HASH: &str = "0x1ba3c9a2b24a034b77e3f5d5ab1e9b5d24f0e0a8f4b9ad2c7cbd0c0f83c2d1aa";

#[derive(Debug, Clone)]
struct Captured {
    headers: HashMap<String, String>,
    body: Value,
}

type Requests = Arc<Mutex<Vec<Captured>>>;

fn known_record() -> Value {
    json!({
        "type": "0x7e",
        "hash": KNOWN_HASH,
        "input": "0xdeadbeef",
        "nonce": "0x2a",
        "gas": "0x2dc6c0",
        "to": "0x781e90f1c8fc4611c9b7497c3b47f99ef6969cbc",
        "value": "0x0",
        "sender": "0x7885bcbd5cecef1336b5300fb5186a12ddd8c478",
        "queueIndex": "0x2a",
        "skipReason": "row consumption overflow",
        "skipBlockNumber": "0x4d2"
    })
}

// Canned l2geth answers, keyed on method and params
fn reply(request: &Value) -> Value {
    match request["method"].as_str().unwrap_or_default() {
        "eth_chainId" => json!("0x82750"),
        GET_NUM_SKIPPED_TXS => json!(42),
        GET_SKIPPED_TX_HASHES => json!([KNOWN_HASH]),
        GET_SKIPPED_TX if request["params"][0] == json!(KNOWN_HASH) => known_record(),
        GET_SKIPPED_TX => Value::Null,
        GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK => json!({ "executionResults": [{ "failed": false }] }),
        _ => Value::Null,
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

// Serves one HTTP request per connection and closes it
async fn handle(mut socket: TcpStream, requests: Requests) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let headers: HashMap<String, String> = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body: Value = serde_json::from_slice(&buf[header_end..header_end + content_length])
        .map_err(std::io::Error::other)?;
    let response = json!({ "jsonrpc": "2.0", "id": body["id"], "result": reply(&body) }).to_string();
    requests.lock().unwrap().push(Captured { headers, body });

    let http = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.len(),
        response
    );
    socket.write_all(http.as_bytes()).await?;
    socket.shutdown().await
}

async fn spawn_node() -> Result<(String, Requests)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    let requests: Requests = Arc::default();

    let captured = requests.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let captured = captured.clone();
            tokio::spawn(async move {
                let _ = handle(socket, captured).await;
            });
        }
    });

    Ok((url, requests))
}

fn last_request(requests: &Requests, method: &str) -> Captured {
    requests
        .lock()
        .unwrap()
        .iter()
        .rev()
        .find(|r| r.body["method"] == json!(method))
        .cloned()
        .unwrap_or_else(|| panic!("no {} request recorded", method))
}

#[tokio::test]
async fn connect_checks_chain_id_and_asks_for_gzip() -> Result<()> {
    let (url, requests) = spawn_node().await?;

    ScrollClient::connect(&url).await?;

    let chain_id = last_request(&requests, "eth_chainId");
    let accept = chain_id.headers.get("accept-encoding").cloned().unwrap_or_default();
    assert!(accept.contains("gzip"), "accept-encoding was {:?}", accept);
    Ok(())
}

#[tokio::test]
async fn connect_fails_without_node() -> Result<()> {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let err = ScrollClient::connect(&url).await.err().expect("connect should fail");
    assert!(matches!(err, PipelineError::Connection { .. }));

    let err = ScrollClient::connect("not a url").await.err().expect("connect should fail");
    assert!(matches!(err, PipelineError::Connection { .. }));
    Ok(())
}

#[tokio::test]
async fn skipped_transaction_calls_use_scroll_methods() -> Result<()> {
    let (url, requests) = spawn_node().await?;
    let client = ScrollClient::connect(&url).await?;
    let known: B256 = KNOWN_HASH.parse()?;

    assert_eq!(client.count_skipped_transactions().await?, 42);
    assert!(last_request(&requests, GET_NUM_SKIPPED_TXS).body["params"].as_array().is_none_or(|p| p.is_empty()));

    assert_eq!(client.skipped_transaction_hashes(0, 1).await?, vec![known]);
    assert_eq!(last_request(&requests, GET_SKIPPED_TX_HASHES).body["params"], json!([0, 1]));

    let tx = client.skipped_transaction(known).await?;
    assert_eq!(tx.hash, known);
    assert_eq!(tx.block_number(), Some(1234));
    assert_eq!(last_request(&requests, GET_SKIPPED_TX).body["params"], json!([KNOWN_HASH]));
    Ok(())
}

#[tokio::test]
async fn null_skipped_transaction_is_empty_response() -> Result<()> {
    let (url, _requests) = spawn_node().await?;
    let client = ScrollClient::connect(&url).await?;

    let err = client.skipped_transaction(B256::repeat_byte(0x77)).await.unwrap_err();

    assert!(matches!(
        err,
        RpcError::EmptyResponse { method: GET_SKIPPED_TX, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn trace_sends_tx_block_and_null_config() -> Result<()> {
    let (url, requests) = spawn_node().await?;
    let client = ScrollClient::connect(&url).await?;
    let record: SkippedTransaction = serde_json::from_value(known_record())?;
    let tx = record.to_envelope()?;

    let trace = client
        .trace_block_on_top_of(&tx, BlockId::Number(BlockNumberOrTag::Number(1234)), None)
        .await?;

    assert_eq!(trace, json!({ "executionResults": [{ "failed": false }] }));
    let params = last_request(&requests, GET_TX_BLOCK_TRACE_ON_TOP_OF_BLOCK).body["params"].clone();
    let params = params.as_array().expect("params array");
    assert_eq!(params.len(), 3);
    assert_eq!(params[0]["hash"], json!(KNOWN_HASH));
    assert_eq!(params[1], json!("0x4d2"));
    assert_eq!(params[2], Value::Null);
    Ok(())
}
