//! Runtime configuration: environment (and `.env`) → typed values.

use std::time::Duration;

use anyhow::{Context, Result};
use contract_binding::config::{BindingConfig, RpcConfig, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use contract_binding::params::TxParams;

/// Console settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// JSON-RPC endpoint, e.g. `http://localhost:8545`.
    pub rpc_url: String,
    /// Pinned network id; `None` asks the node (`net_version`).
    pub network: Option<String>,
    /// How long to wait for a transaction to be mined; zero waits forever.
    pub confirmation_timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Gas limit sent with every transaction, if set.
    pub gas: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: RpcConfig::default().url(),
            network: None,
            confirmation_timeout: BindingConfig::default().synchronization_timeout,
            request_timeout: Duration::from_secs(20),
            gas: None,
        }
    }
}

impl Config {
    /// Load config from the process environment (after reading `.env`, if any).
    ///
    /// Recognized variables:
    /// - `RPC_URL`, or `RPC_HOST` + `RPC_PORT` (default `localhost:8545`)
    /// - `NETWORK_ID` (optional)
    /// - `CONFIRMATION_TIMEOUT_SECS` (default 240, 0 = no timeout)
    /// - `REQUEST_TIMEOUT_SECS` (default 20)
    /// - `GAS_LIMIT` (optional)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let rpc_url = match get("RPC_URL") {
            Some(url) => url,
            None => {
                let host = get("RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string());
                let port = match get("RPC_PORT") {
                    Some(p) => p.parse::<u16>().with_context(|| format!("Invalid RPC_PORT: {p}"))?,
                    None => DEFAULT_RPC_PORT,
                };
                RpcConfig::new(host, port).url()
            }
        };

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match get(key) {
                Some(v) => Ok(Duration::from_secs(v.parse::<u64>().with_context(|| format!("Invalid {key}: {v}"))?)),
                None => Ok(default),
            }
        };

        let gas = match get("GAS_LIMIT") {
            Some(v) => Some(v.parse::<u64>().with_context(|| format!("Invalid GAS_LIMIT: {v}"))?),
            None => None,
        };

        Ok(Self {
            rpc_url,
            network: get("NETWORK_ID"),
            confirmation_timeout: secs("CONFIRMATION_TIMEOUT_SECS", defaults.confirmation_timeout)?,
            request_timeout: secs("REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            gas,
        })
    }

    /// Binding configuration handed to the contract factories.
    pub fn binding_config(&self) -> BindingConfig {
        let mut cfg = BindingConfig::default().with_synchronization_timeout(self.confirmation_timeout);
        if let Some(network) = &self.network {
            cfg = cfg.with_network(network.clone());
        }
        if let Some(gas) = self.gas {
            cfg = cfg.with_defaults(TxParams::new().gas(gas));
        }
        cfg
    }
}
