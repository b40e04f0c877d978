//! Core chain types used by the binding layer.
//!
//! These models are intentionally conservative and forward-compatible:
//! - Fixed-size values (addresses, hashes, quantities) use `alloy-primitives`.
//! - Unknown/extension fields from the node are preserved via `#[serde(flatten)]`.
//!
//! For address validation, see `crate::address`.

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque transaction handle returned by `eth_sendTransaction`.
pub type TxHash = B256;

/// Network identifier as reported by `net_version` (or a named key such as
/// `"default"` in a contract descriptor).
pub type NetworkId = String;

/// Event log entry as found in receipts and `eth_getLogs` results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<U64>,
    #[serde(default)]
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Transaction receipt returned by `eth_getTransactionReceipt` once mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: TxHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
    /// Set for contract-creation transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cumulative_gas_used: Option<U256>,
    /// Post-Byzantium status flag (`0x1` success, `0x0` revert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(default)]
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Receipt {
    /// `false` only when the node reports an explicit failure status.
    pub fn succeeded(&self) -> bool {
        self.status.map_or(true, |s| s != U64::ZERO)
    }
}

/// A mined transaction: the handle that was submitted and its receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub receipt: Receipt,
}
