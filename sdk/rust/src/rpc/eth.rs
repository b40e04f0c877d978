//! Typed wrappers over the JSON-RPC methods the binding layer uses.
//!
//! Each helper is a single round-trip; errors from the transport are returned
//! untouched.

use crate::error::{Error, Result};
use crate::rpc::Transport;
use crate::types::{Log, Receipt, TxHash};
use alloy_primitives::{Address, Bytes, U256};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Issue `method` and deserialize its result.
pub async fn call<T: DeserializeOwned>(transport: &dyn Transport, method: &str, params: Value) -> Result<T> {
    debug!(%method, "rpc.call");
    let raw = transport.request(method, params).await?;
    serde_json::from_value(raw.clone())
        .map_err(|e| Error::RpcResponse(format!("{method}: {e}; result={raw}")))
}

/// `net_version` → network id string (`"1"`, `"1337"`, ...).
pub async fn net_version(transport: &dyn Transport) -> Result<String> {
    // Some nodes answer with a number instead of a string.
    let raw: Value = call(transport, "net_version", json!([])).await?;
    match raw {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::RpcResponse(format!("net_version: unexpected result {other}"))),
    }
}

/// `eth_accounts`
pub async fn accounts(transport: &dyn Transport) -> Result<Vec<Address>> {
    call(transport, "eth_accounts", json!([])).await
}

/// `eth_call` against the latest block; returns the raw return data.
pub async fn eth_call(transport: &dyn Transport, tx: Value) -> Result<Bytes> {
    call(transport, "eth_call", json!([tx, "latest"])).await
}

/// `eth_sendTransaction`; returns the transaction handle.
pub async fn send_transaction(transport: &dyn Transport, tx: Value) -> Result<TxHash> {
    call(transport, "eth_sendTransaction", json!([tx])).await
}

/// `eth_estimateGas`
pub async fn estimate_gas(transport: &dyn Transport, tx: Value) -> Result<U256> {
    call(transport, "eth_estimateGas", json!([tx])).await
}

/// `eth_getTransactionReceipt`; `None` until the transaction is mined.
pub async fn get_transaction_receipt(transport: &dyn Transport, tx_hash: &TxHash) -> Result<Option<Receipt>> {
    call(transport, "eth_getTransactionReceipt", json!([tx_hash])).await
}

/// `eth_getCode` at the latest block.
pub async fn get_code(transport: &dyn Transport, address: &Address) -> Result<Bytes> {
    call(transport, "eth_getCode", json!([address, "latest"])).await
}

/// `eth_getLogs`
pub async fn get_logs(transport: &dyn Transport, filter: Value) -> Result<Vec<Log>> {
    call(transport, "eth_getLogs", json!([filter])).await
}
