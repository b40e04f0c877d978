use core::fmt;
use serde::Deserialize;
use thiserror::Error;

/// Common result alias for the binding layer.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structured JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObj {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorObj {
    pub fn new(code: i64, message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self { code, message: message.into(), data }
    }
}

impl fmt::Display for RpcErrorObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(d) = &self.data {
            write!(f, "RPC error {}: {} (data={})", self.code, self.message, d)
        } else {
            write!(f, "RPC error {}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for RpcErrorObj {}

/// Top-level binding error.
///
/// RPC failures are surfaced as-is; the only automatic retry anywhere in the
/// crate is the receipt polling loop.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    // ---- Transport / IO ----------------------------------------------------
    /// Network error (request building, connection, DNS, etc.).
    #[error("network error: {0}")]
    Network(String),

    /// HTTP status error (non-2xx).
    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    // ---- Encoding / Decoding ----------------------------------------------
    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    // ---- RPC / Protocol ----------------------------------------------------
    /// JSON-RPC error response with structured details.
    #[error("{0}")]
    Rpc(RpcErrorObj),

    /// RPC response had an unexpected shape.
    #[error("malformed rpc response: {0}")]
    RpcResponse(String),

    /// Transaction was not mined before the confirmation timeout.
    #[error("Transaction {tx_hash} wasn't processed in {elapsed_secs} seconds!")]
    ReceiptTimeout { tx_hash: String, elapsed_secs: u64 },

    // ---- Contract descriptor -----------------------------------------------
    /// A deployment was attempted before a provider was configured.
    #[error("{contract} error: Please call with_provider() first before calling deploy().")]
    NoProvider { contract: String },

    /// The descriptor carries no bytecode for the selected network.
    #[error("{contract} error: contract binary not set. Can't deploy new instance.")]
    MissingBinary { contract: String },

    /// The bytecode still contains library placeholders.
    #[error(
        "{contract} contains unresolved libraries. You must deploy and link the following \
         libraries before you can deploy a new version of {contract}: {libraries}"
    )]
    UnlinkedLibraries { contract: String, libraries: String },

    /// Malformed address handed to an address-based lookup.
    #[error("Invalid address passed to {contract}.at(): {address}")]
    InvalidAddress { contract: String, address: String },

    /// No deployed address recorded for the selected network.
    #[error("Cannot find deployed address: {contract} not deployed or address not set.")]
    NotDeployed { contract: String },

    /// The node reports a network the descriptor has no artifacts for.
    #[error("{contract} error: Can't find artifacts for network id '{network_id}'")]
    UnknownNetwork { contract: String, network_id: String },

    /// Deployment mined but the node holds no code at the new address.
    #[error("The contract code couldn't be stored at {address}, please check your gas amount.")]
    ContractNotStored { address: String },

    // ---- ABI / Contracts ---------------------------------------------------
    /// ABI validation or encoding/decoding error.
    #[error("abi error: {0}")]
    Abi(String),

    /// No function with that name (and arity) in the ABI.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// Invalid parameters for a call.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl Error {
    /// Whether this error came back from the node or the wire rather than
    /// from local validation.
    pub fn is_rpc(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::HttpStatus { .. } | Error::Rpc(_) | Error::RpcResponse(_)
        )
    }
}

// ---- Conversions from common backends ---------------------------------------

#[cfg(feature = "native")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Error::HttpStatus { status: status.as_u16(), body: e.to_string() }
        } else {
            Error::Network(e.to_string())
        }
    }
}

impl From<RpcErrorObj> for Error {
    fn from(e: RpcErrorObj) -> Self {
        Error::Rpc(e)
    }
}

impl From<alloy_dyn_abi::Error> for Error {
    fn from(e: alloy_dyn_abi::Error) -> Self {
        Error::Abi(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_handle_and_seconds() {
        let e = Error::ReceiptTimeout { tx_hash: "0xabc".into(), elapsed_secs: 240 };
        let msg = e.to_string();
        assert!(msg.contains("0xabc"));
        assert!(msg.contains("240 seconds"));
    }

    #[test]
    fn rpc_error_display_includes_data() {
        let e: Error = RpcErrorObj::new(-32000, "out of gas", Some(serde_json::json!("0x"))).into();
        assert_eq!(e.to_string(), "RPC error -32000: out of gas (data=\"0x\")");
        assert!(e.is_rpc());
        assert!(!Error::UnknownMethod("x".into()).is_rpc());
    }
}
