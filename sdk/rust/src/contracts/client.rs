//! A contract bound to an address: the call dispatcher.
//!
//! Every ABI function is reachable through [`Contract::invoke`], which looks
//! the function up by name (argument count picks among overloads; same-arity
//! overloads need the full signature, e.g. `"set(address)"`) and picks the
//! dispatch path from its ABI flags:
//!
//! - read-only (`constant`, `view`, `pure`) → one `eth_call`, decoded result
//!   returned as [`Outcome::Value`];
//! - anything else → `eth_sendTransaction`, then the confirmation poller,
//!   returned as [`Outcome::Confirmed`].
//!
//! A trailing options object in `args` is split off and merged over the
//! configured defaults first (see `crate::params`). The explicit per-path
//! entry points (`call`, `send_transaction`, `estimate_gas`, `request`) and
//! their `*_with` variants taking [`TxParams`] directly are what generated
//! bindings use.

use crate::abi::{decode_output, encode_call, outputs_to_json, Abi, AbiItem};
use crate::config::BindingConfig;
use crate::contracts::events::{decode_logs, DecodedEvent};
use crate::contracts::poller::ConfirmationPoller;
use crate::contracts::typed::FromOutputs;
use crate::error::{Error, Result};
use crate::params::{split_tx_params, TxParams};
use crate::rpc::{eth, Provider};
use crate::types::{Confirmation, Receipt, TxHash};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, U256};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Result of a dynamically dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Decoded return value of a read-only call.
    Value(Value),
    /// A mined state-changing transaction.
    Confirmed(Confirmation),
}

impl Outcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            Outcome::Confirmed(_) => None,
        }
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Confirmed(c) => Some(c),
        }
    }
}

/// Contract instance at a fixed address.
#[derive(Clone)]
pub struct Contract {
    name: String,
    abi: Arc<Abi>,
    address: Address,
    transaction_hash: Option<TxHash>,
    provider: Provider,
    config: Arc<BindingConfig>,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("transaction_hash", &self.transaction_hash)
            .finish()
    }
}

impl Contract {
    pub fn new(
        name: impl Into<String>,
        abi: Arc<Abi>,
        address: Address,
        provider: Provider,
        config: Arc<BindingConfig>,
    ) -> Self {
        Self { name: name.into(), abi, address, transaction_hash: None, provider, config }
    }

    /// Record the creation transaction (set by deployments).
    pub fn with_transaction_hash(mut self, tx_hash: TxHash) -> Self {
        self.transaction_hash = Some(tx_hash);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Creation transaction, when this instance came from a deployment.
    pub fn transaction_hash(&self) -> Option<TxHash> {
        self.transaction_hash
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    // ---- dynamic surface --------------------------------------------------

    /// Dispatch `method` according to its ABI classification.
    #[instrument(level = "debug", skip(self, args), fields(contract = %self.name))]
    pub async fn invoke(&self, method: &str, mut args: Vec<Value>) -> Result<Outcome> {
        let params = self.split(&mut args)?;
        let item = self.abi.function(method, args.len())?;
        if item.is_read_only() {
            debug!(%method, "dispatch as call");
            let data = self.raw_call(item, &args, params).await?;
            Ok(Outcome::Value(outputs_to_json(&decode_output(item, &data)?)))
        } else {
            debug!(%method, "dispatch as transaction");
            let tx_hash = self.submit(item, &args, params).await?;
            Ok(Outcome::Confirmed(self.poller().wait(self.provider.as_ref(), tx_hash).await?))
        }
    }

    /// `eth_call` regardless of the function's ABI flags.
    pub async fn call(&self, method: &str, mut args: Vec<Value>) -> Result<Value> {
        let params = self.split(&mut args)?;
        self.call_with(method, args, params).await
    }

    /// Submit a transaction without waiting for it to be mined.
    pub async fn send_transaction(&self, method: &str, mut args: Vec<Value>) -> Result<TxHash> {
        let params = self.split(&mut args)?;
        self.send_transaction_with(method, args, params).await
    }

    /// Submit and wait for the receipt.
    pub async fn send_and_confirm(&self, method: &str, mut args: Vec<Value>) -> Result<Confirmation> {
        let params = self.split(&mut args)?;
        self.send_and_confirm_with(method, args, params).await
    }

    /// `eth_estimateGas` for the call.
    pub async fn estimate_gas(&self, method: &str, mut args: Vec<Value>) -> Result<U256> {
        let params = self.split(&mut args)?;
        self.estimate_gas_with(method, args, params).await
    }

    /// JSON-RPC request payload for the call, without sending it. Read-only
    /// functions produce an `eth_call`, others an `eth_sendTransaction`.
    pub fn request(&self, method: &str, mut args: Vec<Value>) -> Result<Value> {
        let params = self.split(&mut args)?;
        let item = self.abi.function(method, args.len())?;
        let tx = self.build_tx(item, &args, params)?.to_json()?;
        Ok(if item.is_read_only() {
            json!({"jsonrpc": "2.0", "method": "eth_call", "params": [tx, "latest"]})
        } else {
            json!({"jsonrpc": "2.0", "method": "eth_sendTransaction", "params": [tx]})
        })
    }

    // ---- explicit-params surface -------------------------------------------

    pub async fn call_with(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<Value> {
        Ok(outputs_to_json(&self.call_tokens(method, args, params).await?))
    }

    /// Read-only call decoded into a Rust type.
    pub async fn call_as<T: FromOutputs>(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<T> {
        T::from_outputs(self.call_tokens(method, args, params).await?)
    }

    pub async fn send_transaction_with(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<TxHash> {
        let item = self.abi.function(method, args.len())?;
        self.submit(item, &args, params).await
    }

    pub async fn send_and_confirm_with(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<Confirmation> {
        let tx_hash = self.send_transaction_with(method, args, params).await?;
        self.poller().wait(self.provider.as_ref(), tx_hash).await
    }

    pub async fn estimate_gas_with(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<U256> {
        let item = self.abi.function(method, args.len())?;
        let tx = self.build_tx(item, &args, params)?;
        eth::estimate_gas(self.provider.as_ref(), tx.to_json()?).await
    }

    // ---- events ------------------------------------------------------------

    /// Events in `receipt` emitted by this contract's ABI.
    pub fn decode_events(&self, receipt: &Receipt) -> Result<Vec<DecodedEvent>> {
        decode_logs(&self.abi, &receipt.logs)
    }

    /// Logs emitted at this address since `from_block`, optionally only the
    /// event called `name`.
    pub async fn past_events(&self, name: Option<&str>, from_block: u64) -> Result<Vec<DecodedEvent>> {
        let mut filter = json!({
            "address": self.address,
            "fromBlock": format!("{from_block:#x}"),
            "toBlock": "latest",
        });
        if let Some(name) = name {
            let event = self
                .abi
                .event(name)
                .ok_or_else(|| Error::UnknownMethod(format!("event {name}")))?;
            filter["topics"] = json!([event.topic()]);
        }
        let logs = eth::get_logs(self.provider.as_ref(), filter).await?;
        decode_logs(&self.abi, &logs)
    }

    // ---- internals ---------------------------------------------------------

    fn poller(&self) -> ConfirmationPoller {
        ConfirmationPoller::from_config(&self.config)
    }

    fn split(&self, args: &mut Vec<Value>) -> Result<TxParams> {
        Ok(split_tx_params(args)?.unwrap_or_default())
    }

    fn build_tx(&self, item: &AbiItem, args: &[Value], params: TxParams) -> Result<TxParams> {
        let mut tx = params.merged_over(&self.config.defaults);
        tx.to = Some(self.address);
        tx.data = Some(Bytes::from(encode_call(item, args)?));
        Ok(tx)
    }

    async fn raw_call(&self, item: &AbiItem, args: &[Value], params: TxParams) -> Result<Bytes> {
        let tx = self.build_tx(item, args, params)?;
        eth::eth_call(self.provider.as_ref(), tx.to_json()?).await
    }

    async fn call_tokens(&self, method: &str, args: Vec<Value>, params: TxParams) -> Result<Vec<DynSolValue>> {
        let item = self.abi.function(method, args.len())?;
        let data = self.raw_call(item, &args, params).await?;
        decode_output(item, &data)
    }

    async fn submit(&self, item: &AbiItem, args: &[Value], params: TxParams) -> Result<TxHash> {
        let tx = self.build_tx(item, args, params)?;
        let tx_hash = eth::send_transaction(self.provider.as_ref(), tx.to_json()?).await?;
        info!(contract = %self.name, method = item.name(), tx = %tx_hash, "transaction submitted");
        Ok(tx_hash)
    }
}
