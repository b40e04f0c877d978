//! Typed, asynchronous bindings for Ethereum-style contracts described by
//! per-network artifacts (ABI + bytecode + deployed addresses).
//!
//! - [`contracts::ContractFactory`]: deploy, link libraries, bind to an
//!   address, pick the network the node reports.
//! - [`contracts::Contract`]: call dispatcher. Read-only functions become one
//!   `eth_call`; everything else is submitted and polled until mined.
//! - [`rpc::Transport`]: the JSON-RPC seam; [`rpc::http::HttpTransport`]
//!   is the reqwest-backed default (feature `native`).
//!
//! Configuration is immutable: a [`config::BindingConfig`] is handed to each
//! factory and copied into every instance it creates.

pub mod abi;
pub mod address;
pub mod config;
pub mod contracts;
pub mod error;
pub mod params;
pub mod rpc;
pub mod types;

pub use error::{Error, Result};

/// Everything a typical caller (or generated binding) needs.
pub mod prelude {
    pub use crate::config::{BindingConfig, RpcConfig};
    pub use crate::contracts::{
        Contract, ContractFactory, DecodedEvent, FromOutputs, IntoArg, Outcome,
    };
    pub use crate::params::TxParams;
    #[cfg(feature = "native")]
    pub use crate::rpc::http::HttpTransport;
    pub use crate::rpc::{Provider, Transport};
    pub use crate::types::{Confirmation, Receipt, TxHash};
    pub use crate::{Error, Result};
    pub use alloy_primitives::{Address, Bytes, FixedBytes, B256, I256, U256};
}
