use alloy_network::AnyTxEnvelope;
use alloy_primitives::{hex, Bytes, B256, U64};
use alloy_serde::OtherFields;
use serde::{Deserialize, Serialize};
use serde_json::Value;

////////////////////////////////////// RPC Data ////////////////////////////////////////
///////////////////////////// scroll_getSkippedTransaction /////////////////////////////
/// A transaction the sequencer skipped, as returned by `scroll_getSkippedTransaction`.
///
/// Only the fields the pipeline reads are typed. Everything else the node sends
/// (sender, nonce, gas, signature, queue index, ...) is kept in `other` and
/// written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTransaction {
    pub hash: B256,
    pub input: Bytes,
    #[serde(default)]
    pub skip_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_block_number: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accesses: Option<Value>,
    // Only populated when the node stores traces of skipped transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traces: Option<Value>,
    #[serde(flatten)]
    pub other: OtherFields,
}

impl SkippedTransaction {
    /// Hex of the call data, without `0x`. Two records with the same key are the same
    /// logical transaction.
    pub fn dedup_key(&self) -> String {
        hex::encode(&self.input)
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.hash)
    }

    pub fn block_number(&self) -> Option<u64> {
        self.skip_block_number.map(|n| n.to::<u64>())
    }

    /// Rebuild the signed transaction the node understands.
    ///
    /// Goes through JSON since the RPC record carries fields the envelope types do not
    /// know about. Transaction types alloy does not model (L1 messages) come back as
    /// `AnyTxEnvelope::Unknown`.
    pub fn to_envelope(&self) -> Result<AnyTxEnvelope, serde_json::Error> {
        let value = serde_json::to_value(self)?;
        serde_json::from_value(value)
    }
}

pub fn envelope_hash(tx: &AnyTxEnvelope) -> B256 {
    match tx {
        AnyTxEnvelope::Ethereum(inner) => *inner.tx_hash(),
        AnyTxEnvelope::Unknown(inner) => inner.hash,
    }
}
